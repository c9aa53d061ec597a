//! A placed piece on the table
//!
//! Stack linkage lives directly on the entity: a root owns the ordered
//! `members` list (index 0 = bottom, last = top), every other member points
//! back at the root. An entity never has both a root and members. Only the
//! stack model and the world arena touch the linkage fields.

use std::sync::Arc;

use crate::combat::capability::CombatStats;
use crate::core::types::{Bounds, EntityId, Vec2, ZoneId};
use crate::entity::definition::{EntityDefinition, Faction, Tag};

/// Axis-aligned collision footprint relative to the entity position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub size: Vec2,
    pub offset: Vec2,
    /// Disabled colliders don't contribute to stack bounds
    pub enabled: bool,
}

impl Collider {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            offset: Vec2::ZERO,
            enabled: true,
        }
    }

    pub fn bounds_at(&self, position: Vec2) -> Option<Bounds> {
        self.enabled
            .then(|| Bounds::from_center_size(position + self.offset, self.size))
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub definition: Arc<EntityDefinition>,
    pub position: Vec2,
    pub collider: Collider,

    pub(crate) root: Option<EntityId>,
    pub(crate) members: Vec<EntityId>,
    pub(crate) offset_from_root: Vec2,

    /// Zone the entity's stack was last found fully inside (cached on roots)
    pub current_zone: Option<ZoneId>,
    /// Currently worn equipment, if this is a holder
    pub equipped: Option<Arc<EntityDefinition>>,
    pub combat: Option<CombatStats>,
    /// Remaining resource durability; initialised on first hit
    pub durability: Option<f32>,
    /// Held by the pointer
    pub dragging: bool,
}

impl Entity {
    pub fn new(id: EntityId, definition: Arc<EntityDefinition>, position: Vec2) -> Self {
        let combat = definition
            .is_combatant()
            .then(|| CombatStats::from_template(&definition.stats));
        Self {
            id,
            collider: Collider::new(definition.size),
            definition,
            position,
            root: None,
            members: Vec::new(),
            offset_from_root: Vec2::ZERO,
            current_zone: None,
            equipped: None,
            combat,
            durability: None,
            dragging: false,
        }
    }

    /// Deferred setup: swap the definition after spawn
    pub fn set_definition(&mut self, definition: Arc<EntityDefinition>) {
        self.collider.size = definition.size;
        if self.combat.is_none() && definition.is_combatant() {
            self.combat = Some(CombatStats::from_template(&definition.stats));
        }
        self.definition = definition;
    }

    /// Root of the stack this entity is in (`None` = self is root)
    pub fn root(&self) -> Option<EntityId> {
        self.root
    }

    /// Ordered members when this is the root of a multi-entity stack
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    pub fn offset_from_root(&self) -> Vec2 {
        self.offset_from_root
    }

    pub fn is_root(&self) -> bool {
        self.root.is_none()
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.definition.has_tag(tag)
    }

    pub fn faction(&self) -> Faction {
        self.definition.faction()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.collider.bounds_at(self.position)
    }

    pub fn is_dead(&self) -> bool {
        use crate::combat::capability::Combatant;
        self.combat.as_ref().is_some_and(|c| c.is_dead())
    }

    /// Strip all linkage, leaving an independent singleton
    pub(crate) fn unlink(&mut self) {
        self.root = None;
        self.members.clear();
        self.offset_from_root = Vec2::ZERO;
    }
}
