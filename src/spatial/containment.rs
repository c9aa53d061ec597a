//! Zone containment
//!
//! A stack counts as inside a zone only when five samples of its bounding
//! box (center plus four corners) all pass the zone's point test, so a stack
//! straddling an edge is never mistaken for one that's fully inside.

use crate::core::types::{Bounds, EntityId, ZoneId};
use crate::stack::{get_root, stack_world_bounds};
use crate::world::World;
use crate::zone::{ZoneNotice, ZoneRegistry};

/// Zone membership before and after a position change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneChange {
    pub root: EntityId,
    pub previous: Option<ZoneId>,
    pub current: Option<ZoneId>,
}

impl ZoneChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// First registered zone that fully contains the stack's bounds
///
/// A crafting bench or lane inside a generic zone shadows it; registration
/// keeps rule-bearing zones from overlapping each other.
pub fn find_containing_zone(world: &World, zones: &ZoneRegistry, root: EntityId) -> Option<ZoneId> {
    let samples = stack_world_bounds(world, root).sample_points();
    zones
        .iter()
        .filter(|zone| samples.iter().all(|p| zone.contains(*p)))
        .min_by_key(|zone| !zone.category().has_rules())
        .map(|zone| zone.id)
}

/// Strict superset test on X/Y: the stack's bounds lie within `area`
pub fn is_area_containing(area: &Bounds, world: &World, root: EntityId) -> bool {
    area.contains_bounds(&stack_world_bounds(world, root))
}

/// Recompute and cache the stack's zone, then let the old and new zones
/// refresh whatever depends on their contents
///
/// Called exactly once after any operation that settles a stack somewhere.
pub fn raise_position_changed(
    world: &mut World,
    zones: &mut ZoneRegistry,
    id: EntityId,
) -> Option<(ZoneChange, Vec<ZoneNotice>)> {
    let root = get_root(world, id)?;
    let current = find_containing_zone(world, zones, root);
    let previous = {
        let entity = world.get_mut(root)?;
        let previous = entity.current_zone;
        entity.current_zone = current;
        previous
    };

    let change = ZoneChange {
        root,
        previous,
        current,
    };
    if change.changed() {
        tracing::debug!(root = %root, ?previous, ?current, "stack changed zone");
    }

    let mut notices = Vec::new();
    let mut touched = Vec::with_capacity(2);
    touched.extend(previous);
    if current != previous {
        touched.extend(current);
    }
    for zone in touched {
        notices.extend(zones.refresh(zone, world));
    }

    Some((change, notices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::entity::definition::EntityDefinition;
    use crate::zone::Zone;
    use std::sync::Arc;

    fn square_world(center: Vec2) -> (World, EntityId) {
        let mut world = World::default();
        let def = Arc::new(EntityDefinition::new("tile", vec![]).with_size(Vec2::new(2.0, 2.0)));
        let id = world.spawn(def, center);
        (world, id)
    }

    #[test]
    fn test_exact_fit_is_contained() {
        let (world, id) = square_world(Vec2::new(1.0, 1.0));
        let mut zones = ZoneRegistry::new();
        let zone = zones
            .register(Zone::generic("pad", Bounds::new(Vec2::ZERO, Vec2::new(2.0, 2.0))))
            .unwrap();
        assert_eq!(find_containing_zone(&world, &zones, id), Some(zone));
    }

    #[test]
    fn test_one_unit_outside_is_not_contained() {
        let (world, id) = square_world(Vec2::new(1.0, 1.0));
        let mut zones = ZoneRegistry::new();
        zones
            .register(Zone::generic("pad", Bounds::new(Vec2::ZERO, Vec2::new(2.0, 1.0))))
            .unwrap();
        assert_eq!(find_containing_zone(&world, &zones, id), None);
    }

    #[test]
    fn test_partial_overlap_is_not_contained() {
        let (world, id) = square_world(Vec2::new(3.5, 1.0));
        let mut zones = ZoneRegistry::new();
        zones
            .register(Zone::generic("pad", Bounds::new(Vec2::ZERO, Vec2::new(4.0, 4.0))))
            .unwrap();
        assert!(zones.iter().next().unwrap().contains(Vec2::new(3.5, 1.0)));
        assert_eq!(find_containing_zone(&world, &zones, id), None);
    }

    #[test]
    fn test_bench_inside_generic_zone_wins() {
        let (world, id) = square_world(Vec2::new(5.0, 5.0));
        let mut zones = ZoneRegistry::new();
        zones
            .register(Zone::generic("rug", Bounds::new(Vec2::ZERO, Vec2::new(20.0, 20.0))))
            .unwrap();
        let bench = zones
            .register(Zone::crafting("bench", Bounds::new(Vec2::new(3.0, 3.0), Vec2::new(8.0, 8.0))))
            .unwrap();
        assert_eq!(find_containing_zone(&world, &zones, id), Some(bench));
    }

    #[test]
    fn test_area_containment_is_superset() {
        let (world, id) = square_world(Vec2::new(1.0, 1.0));
        assert!(is_area_containing(&Bounds::new(Vec2::ZERO, Vec2::new(5.0, 5.0)), &world, id));
        assert!(!is_area_containing(&Bounds::new(Vec2::new(0.5, 0.0), Vec2::new(5.0, 5.0)), &world, id));
    }

    #[test]
    fn test_raise_caches_zone_on_root() {
        let (mut world, id) = square_world(Vec2::new(1.0, 1.0));
        let mut zones = ZoneRegistry::new();
        let zone = zones
            .register(Zone::generic("pad", Bounds::new(Vec2::ZERO, Vec2::new(4.0, 4.0))))
            .unwrap();

        let (change, _) = raise_position_changed(&mut world, &mut zones, id).unwrap();
        assert!(change.changed());
        assert_eq!(world.get(id).unwrap().current_zone, Some(zone));

        world.get_mut(id).unwrap().position = Vec2::new(10.0, 10.0);
        let (change, _) = raise_position_changed(&mut world, &mut zones, id).unwrap();
        assert_eq!(change.previous, Some(zone));
        assert_eq!(change.current, None);
    }
}
