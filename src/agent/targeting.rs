//! Target acquisition and validation
//!
//! Distances are measured between entity positions. A target that vanished,
//! got picked up, or left the play area is simply invalid; callers treat it
//! as a reason to re-acquire, never as an error.

use ordered_float::OrderedFloat;

use crate::combat::capability::Combatant;
use crate::core::types::{Bounds, EntityId, Vec2};
use crate::entity::definition::Faction;
use crate::entity::instance::Entity;
use crate::spatial::is_area_containing;
use crate::stack::get_root;
use crate::world::World;

/// The entity's whole stack still lies on the table
fn in_area(world: &World, entity: &Entity, area: Option<&Bounds>) -> bool {
    area.map_or(true, |a| {
        let root = get_root(world, entity.id).unwrap_or(entity.id);
        is_area_containing(a, world, root)
    })
}

fn hp_of(entity: &Entity) -> f32 {
    entity.combat.as_ref().map_or(f32::MAX, |c| c.hp())
}

/// Rival to engage: lowest current HP first, nearest as the tie-break
pub fn find_rival(
    world: &World,
    seeker: EntityId,
    faction: Faction,
    radius: f32,
    area: Option<&Bounds>,
) -> Option<(EntityId, f32)> {
    let origin = world.get(seeker)?.position;
    world
        .iter()
        .filter(|e| e.id != seeker && !e.is_dead())
        .filter(|e| faction.is_rival(e.faction()))
        .filter(|e| in_area(world, e, area))
        .map(|e| (e, e.position.distance(&origin)))
        .filter(|(_, d)| *d <= radius)
        .min_by_key(|(e, d)| (OrderedFloat(hp_of(e)), OrderedFloat(*d)))
        .map(|(e, d)| (e.id, d))
}

/// Nearest harvestable stack within `radius`
pub fn find_resource(
    world: &World,
    seeker: EntityId,
    radius: f32,
    area: Option<&Bounds>,
) -> Option<(EntityId, f32)> {
    let origin = world.get(seeker)?.position;
    world
        .roots()
        .filter(|e| e.id != seeker && is_harvestable(world, e, area))
        .map(|e| (e.id, e.position.distance(&origin)))
        .filter(|(_, d)| *d <= radius)
        .min_by_key(|(_, d)| OrderedFloat(*d))
}

fn is_harvestable(world: &World, entity: &Entity, area: Option<&Bounds>) -> bool {
    entity.definition.is_resource() && !entity.dragging && in_area(world, entity, area)
}

/// Distance to a cached resource target, `None` once it's no longer fair game
pub fn resource_distance(
    world: &World,
    seeker: EntityId,
    target: EntityId,
    area: Option<&Bounds>,
) -> Option<f32> {
    let origin = world.get(seeker)?.position;
    let entity = world
        .get(target)
        .filter(|e| e.is_root() && is_harvestable(world, e, area))?;
    Some(entity.position.distance(&origin))
}

pub fn position_of(world: &World, id: EntityId) -> Option<Vec2> {
    world.get(id).map(|e| e.position)
}
