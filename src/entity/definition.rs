//! Entity definitions: the immutable identity a placed piece is spawned from
//!
//! Two entities belong to "the same kind" when their definitions share a
//! key. Stacks only ever form between entities of the same kind.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// Behavioural tags carried by a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// Opposing side; player can't drag these
    Hostile,
    /// Player-controlled unit
    PlayableUnit,
    /// Eligible for exploration lanes
    Character,
    /// Consumed onto a holder when dropped on it
    Equipment,
    /// Can wear one piece of equipment
    EquipHolder,
    /// Pinned to the table
    NonDraggable,
}

/// Which side an entity fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Faction {
    #[default]
    None,
    Friendly,
    Hostile,
}

impl Faction {
    /// True when `other` is on the opposing side
    pub fn is_rival(&self, other: Faction) -> bool {
        matches!(
            (self, other),
            (Faction::Friendly, Faction::Hostile) | (Faction::Hostile, Faction::Friendly)
        )
    }
}

/// Numeric template copied into per-entity state on spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsTemplate {
    pub max_hp: f32,
    pub attack: f32,
    /// Hits a resource can absorb before it's destroyed
    pub durability: f32,
}

impl Default for StatsTemplate {
    fn default() -> Self {
        Self {
            max_hp: 10.0,
            attack: 1.0,
            durability: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub stats: StatsTemplate,
    /// Collision footprint
    #[serde(default = "default_size")]
    pub size: Vec2,
}

fn default_size() -> Vec2 {
    Vec2::new(1.0, 1.4)
}

impl EntityDefinition {
    pub fn new(key: impl Into<String>, tags: Vec<Tag>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            tags,
            stats: StatsTemplate::default(),
            size: default_size(),
        }
    }

    pub fn with_stats(mut self, stats: StatsTemplate) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Anything neither hostile nor a playable unit can be harvested
    pub fn is_resource(&self) -> bool {
        !self.has_tag(Tag::Hostile) && !self.has_tag(Tag::PlayableUnit)
    }

    pub fn is_draggable(&self) -> bool {
        !self.has_tag(Tag::Hostile) && !self.has_tag(Tag::NonDraggable)
    }

    /// Fighting units get combat stats; everything else is inert
    pub fn is_combatant(&self) -> bool {
        self.has_tag(Tag::Hostile) || self.has_tag(Tag::PlayableUnit) || self.has_tag(Tag::Character)
    }

    pub fn faction(&self) -> Faction {
        if self.has_tag(Tag::Hostile) {
            Faction::Hostile
        } else if self.has_tag(Tag::PlayableUnit) {
            Faction::Friendly
        } else {
            Faction::None
        }
    }

    pub fn same_kind(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
