//! Nearest free slot search

use crate::core::types::{Bounds, EntityId, Vec2};
use crate::stack::stack_world_bounds;
use crate::world::World;

/// Closest spot to `start` where a box of `size` overlaps no stack
///
/// Walks square rings of spacing `step` outward, nearest candidates first,
/// skipping spots outside `area`. Gives up after `rings` rings and returns
/// `start`.
pub fn find_free_slot(
    world: &World,
    start: Vec2,
    size: Vec2,
    area: Option<&Bounds>,
    step: f32,
    rings: u32,
    ignore: &[EntityId],
) -> Vec2 {
    let occupied: Vec<Bounds> = world
        .roots()
        .filter(|e| !ignore.contains(&e.id))
        .map(|e| stack_world_bounds(world, e.id))
        .collect();

    let is_free = |center: Vec2| {
        let candidate = Bounds::from_center_size(center, size);
        area.map_or(true, |a| a.contains_bounds(&candidate))
            && !occupied.iter().any(|b| b.intersects(&candidate))
    };

    for ring in 0..=rings as i32 {
        let mut candidates: Vec<Vec2> = Vec::new();
        for dx in -ring..=ring {
            for dy in -ring..=ring {
                if dx.abs().max(dy.abs()) != ring {
                    continue;
                }
                candidates.push(start + Vec2::new(dx as f32 * step, dy as f32 * step));
            }
        }
        candidates.sort_by(|a, b| a.distance(&start).total_cmp(&b.distance(&start)));
        if let Some(found) = candidates.into_iter().find(|c| is_free(*c)) {
            return found;
        }
    }
    start
}
