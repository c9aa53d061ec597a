//! Zones: rectangular regions with their own acceptance rules

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Bounds, EntityId, Vec2, ZoneId};
use crate::entity::definition::Tag;
use crate::stack::members_including_self;
use crate::world::World;
use crate::zone::crafting::CraftingState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneCategory {
    Generic,
    Crafting,
    ExplorationLane,
}

impl ZoneCategory {
    /// Crafting benches and lanes carry their own acceptance rules and win
    /// over any generic zone they sit inside
    pub fn has_rules(self) -> bool {
        !matches!(self, ZoneCategory::Generic)
    }

    /// Whether two zones of these categories may not share any ground
    pub fn conflicts_with(self, other: ZoneCategory) -> bool {
        self == other || (self.has_rules() && other.has_rules())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneRules {
    /// Accepts anything
    Generic,
    /// Holds ingredients until the player triggers a craft
    Crafting(CraftingState),
    /// Character-only lane with a head count
    ExplorationLane { capacity: usize },
}

impl ZoneRules {
    pub fn category(&self) -> ZoneCategory {
        match self {
            ZoneRules::Generic => ZoneCategory::Generic,
            ZoneRules::Crafting(_) => ZoneCategory::Crafting,
            ZoneRules::ExplorationLane { .. } => ZoneCategory::ExplorationLane,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default)]
    pub id: ZoneId,
    pub name: String,
    pub area: Bounds,
    pub rules: ZoneRules,
}

impl Zone {
    pub fn new(name: impl Into<String>, area: Bounds, rules: ZoneRules) -> Self {
        Self {
            id: ZoneId::new(),
            name: name.into(),
            area,
            rules,
        }
    }

    pub fn generic(name: impl Into<String>, area: Bounds) -> Self {
        Self::new(name, area, ZoneRules::Generic)
    }

    pub fn crafting(name: impl Into<String>, area: Bounds) -> Self {
        Self::new(name, area, ZoneRules::Crafting(CraftingState::default()))
    }

    pub fn lane(name: impl Into<String>, area: Bounds, capacity: usize) -> Self {
        Self::new(name, area, ZoneRules::ExplorationLane { capacity })
    }

    pub fn category(&self) -> ZoneCategory {
        self.rules.category()
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.area.contains_point(point)
    }

    pub fn crafting_state(&self) -> Option<&CraftingState> {
        match &self.rules {
            ZoneRules::Crafting(state) => Some(state),
            _ => None,
        }
    }

    pub fn crafting_state_mut(&mut self) -> Option<&mut CraftingState> {
        match &mut self.rules {
            ZoneRules::Crafting(state) => Some(state),
            _ => None,
        }
    }

    /// Roots whose cached zone is this one
    pub fn occupants(&self, world: &World) -> Vec<EntityId> {
        world
            .roots()
            .filter(|e| e.current_zone == Some(self.id))
            .map(|e| e.id)
            .collect()
    }

    /// Member count per definition key across every occupant stack
    pub fn contents(&self, world: &World) -> AHashMap<String, usize> {
        let mut counts = AHashMap::new();
        for root in self.occupants(world) {
            for member in members_including_self(world, root) {
                if let Some(entity) = world.get(member) {
                    *counts.entry(entity.definition.key.clone()).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Whether the kind of stack rooted at `root` belongs here at all
    ///
    /// Lanes only take stacks made entirely of characters.
    pub fn is_eligible(&self, world: &World, root: EntityId) -> bool {
        match &self.rules {
            ZoneRules::Generic | ZoneRules::Crafting(_) => true,
            ZoneRules::ExplorationLane { .. } => {
                let candidate = members_including_self(world, root);
                !candidate.is_empty()
                    && candidate
                        .iter()
                        .all(|id| world.get(*id).is_some_and(|e| e.has_tag(Tag::Character)))
            }
        }
    }

    /// Whether the stack rooted at `root` may settle here
    pub fn can_accept(&self, world: &World, root: EntityId) -> bool {
        if !self.is_eligible(world, root) {
            return false;
        }
        match &self.rules {
            ZoneRules::Generic | ZoneRules::Crafting(_) => true,
            ZoneRules::ExplorationLane { capacity } => {
                let candidate = members_including_self(world, root);
                let seated: usize = self
                    .occupants(world)
                    .into_iter()
                    .filter(|r| *r != root)
                    .map(|r| members_including_self(world, r).len())
                    .sum();
                seated + candidate.len() <= *capacity
            }
        }
    }
}
