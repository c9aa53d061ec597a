//! World registry - generational arena of every live entity
//!
//! Entities are addressed by `EntityId { index, generation }`. Removing an
//! entity bumps its slot's generation so stale ids stop resolving, and the
//! dense `live` list gives O(1) add/remove plus cheap iteration for spatial
//! queries.

use std::sync::Arc;

use crate::core::types::{EntityId, Vec2};
use crate::entity::definition::EntityDefinition;
use crate::entity::instance::Entity;

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
    live_index: usize,
}

/// The table's entity arena
#[derive(Debug, Clone)]
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: Vec<EntityId>,
    /// Display offset of a stack's top member
    top_offset: Vec2,
}

impl World {
    pub fn new(top_offset: Vec2) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: Vec::new(),
            top_offset,
        }
    }

    pub fn top_offset(&self) -> Vec2 {
        self.top_offset
    }

    pub fn spawn(&mut self, definition: Arc<EntityDefinition>, position: Vec2) -> EntityId {
        let live_index = self.live.len();
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.live_index = live_index;
                EntityId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entity: None,
                    live_index,
                });
                EntityId::new(index, 0)
            }
        };

        self.slots[id.index as usize].entity = Some(Entity::new(id, definition, position));
        self.live.push(id);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entity.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entity.as_mut())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live ids in activation order (perturbed by removals)
    pub fn ids(&self) -> &[EntityId] {
        &self.live
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.live.iter().filter_map(|id| self.get(*id))
    }

    /// Roots of every stack on the table
    pub fn roots(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.iter().filter(|e| e.is_root())
    }

    /// Remove an entity, repairing any stack it belonged to in the same call
    ///
    /// A removed member leaves its root with the remaining members (a stack
    /// of one is dissolved). A removed root hands the stack to the next
    /// member up.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let (root, members, zone) = {
            let entity = self.get(id)?;
            (entity.root, entity.members.clone(), entity.current_zone)
        };

        if let Some(root_id) = root {
            self.detach_member(root_id, id);
        } else if members.len() > 1 {
            let rest: Vec<EntityId> = members.into_iter().filter(|m| *m != id).collect();
            self.promote_root(rest, zone);
        }

        let slot = &mut self.slots[id.index as usize];
        let mut entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        let live_index = slot.live_index;
        self.free.push(id.index);

        self.live.swap_remove(live_index);
        if let Some(moved) = self.live.get(live_index).copied() {
            self.slots[moved.index as usize].live_index = live_index;
        }

        entity.unlink();
        Some(entity)
    }

    fn detach_member(&mut self, root_id: EntityId, id: EntityId) {
        let Some(root) = self.get_mut(root_id) else {
            return;
        };
        root.members.retain(|m| *m != id);
        if root.members.len() <= 1 {
            root.members.clear();
        }
        self.relayout_stack(root_id);
    }

    fn promote_root(&mut self, rest: Vec<EntityId>, zone: Option<crate::core::types::ZoneId>) {
        let Some(&new_root) = rest.first() else {
            return;
        };
        for member in &rest {
            if let Some(entity) = self.get_mut(*member) {
                entity.unlink();
                if *member != new_root {
                    entity.root = Some(new_root);
                }
            }
        }
        if let Some(entity) = self.get_mut(new_root) {
            entity.current_zone = zone;
            if rest.len() > 1 {
                entity.members = rest;
            }
        }
        self.relayout_stack(new_root);
    }

    /// Recompute offsets and member positions from the root's position
    ///
    /// Bottom and middle members sit on the root; the top member alone is
    /// shifted by the top offset.
    pub(crate) fn relayout_stack(&mut self, root_id: EntityId) {
        let Some(root) = self.get(root_id) else {
            return;
        };
        let origin = root.position;
        let members = root.members.clone();
        let top = members.len().saturating_sub(1);
        for (index, member) in members.iter().enumerate() {
            let offset = if index == top && index > 0 {
                self.top_offset
            } else {
                Vec2::ZERO
            };
            if let Some(entity) = self.get_mut(*member) {
                entity.offset_from_root = offset;
                entity.position = origin + offset;
            }
        }
        if members.is_empty() {
            if let Some(entity) = self.get_mut(root_id) {
                entity.offset_from_root = Vec2::ZERO;
            }
        }
    }

    /// Describe every broken stack link; empty when the arena is consistent
    pub fn linkage_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        for entity in self.iter() {
            let id = entity.id;
            match entity.root {
                Some(root_id) => {
                    if !entity.members.is_empty() {
                        violations.push(format!("{id} has both a root and members"));
                    }
                    match self.get(root_id) {
                        None => violations.push(format!("{id} points at missing root {root_id}")),
                        Some(root) => {
                            if root.root.is_some() {
                                violations.push(format!("{id} points at non-root {root_id}"));
                            }
                            if !root.members.contains(&id) {
                                violations.push(format!("{root_id} does not list member {id}"));
                            }
                        }
                    }
                }
                None if !entity.members.is_empty() => {
                    if entity.members.len() < 2 {
                        violations.push(format!("{id} owns a one-member list"));
                    }
                    if entity.members.first() != Some(&id) {
                        violations.push(format!("{id} is not at the bottom of its own stack"));
                    }
                    if entity.offset_from_root != Vec2::ZERO {
                        violations.push(format!("{id} root has a non-zero offset"));
                    }
                    for (index, member) in entity.members.iter().enumerate() {
                        if entity.members[..index].contains(member) {
                            violations.push(format!("{id} lists {member} twice"));
                        }
                        if *member == id {
                            continue;
                        }
                        match self.get(*member) {
                            Some(m) if m.root == Some(id) => {}
                            Some(_) => violations.push(format!("{member} disagrees about root {id}")),
                            None => violations.push(format!("{id} lists missing member {member}")),
                        }
                    }
                }
                None => {}
            }
        }
        violations
    }

    /// Drop every entity and reset slot generations
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(crate::core::config::StackConfig::default().top_offset)
    }
}
