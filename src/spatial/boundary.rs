//! Boundary clamp - minimal translation that keeps a stack inside an area
//!
//! Applied after every authoritative move (drag release, AI hop, bounce).
//! A drag still in progress is never clamped.

use serde::{Deserialize, Serialize};

use crate::core::types::{Bounds, EntityId, Vec2};
use crate::spatial::containment::{raise_position_changed, ZoneChange};
use crate::stack::{stack_world_bounds, translate_stack};
use crate::world::World;
use crate::zone::{ZoneNotice, ZoneRegistry};

/// Edge of the play area a move ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundarySide {
    Left,
    Right,
    Bottom,
    Top,
}

/// Signed per-axis delta that brings the offending edge flush with the area
///
/// When a box is wider than the area the low edge wins; the delta never
/// pushes the opposite edge further out than it already is.
pub fn clamp_delta(bounds: &Bounds, area: &Bounds) -> Vec2 {
    fn axis(min: f32, max: f32, lo: f32, hi: f32) -> f32 {
        if min < lo {
            lo - min
        } else if max > hi {
            (hi - max).max(lo - min)
        } else {
            0.0
        }
    }
    Vec2::new(
        axis(bounds.min.x, bounds.max.x, area.min.x, area.max.x),
        axis(bounds.min.y, bounds.max.y, area.min.y, area.max.y),
    )
}

/// Sides a correction delta pushed away from
pub fn struck_sides(delta: Vec2) -> Vec<BoundarySide> {
    let mut sides = Vec::new();
    if delta.x > 0.0 {
        sides.push(BoundarySide::Left);
    } else if delta.x < 0.0 {
        sides.push(BoundarySide::Right);
    }
    if delta.y > 0.0 {
        sides.push(BoundarySide::Bottom);
    } else if delta.y < 0.0 {
        sides.push(BoundarySide::Top);
    }
    sides
}

/// Translate the stack back inside `area`; returns the applied delta
///
/// No area means an unbounded table and never moves anything.
pub fn clamp_stack(world: &mut World, root: EntityId, area: Option<&Bounds>) -> Vec2 {
    let Some(area) = area else {
        return Vec2::ZERO;
    };
    let delta = clamp_delta(&stack_world_bounds(world, root), area);
    if !delta.is_zero() {
        translate_stack(world, root, delta);
    }
    delta
}

/// Clamp and, if anything moved, refresh the stack's zone
///
/// A stack already inside (or an unbounded table) is left untouched.
pub fn clamp_to_area(
    world: &mut World,
    zones: &mut ZoneRegistry,
    root: EntityId,
    area: Option<&Bounds>,
) -> Option<(ZoneChange, Vec<ZoneNotice>)> {
    let delta = clamp_stack(world, root, area);
    if delta.is_zero() {
        return None;
    }
    raise_position_changed(world, zones, root)
}

/// Where the root may go so the whole stack's box, not just its center,
/// stays inside `area` after moving from its current spot to `destination`
pub fn clamp_destination(
    world: &World,
    root: EntityId,
    destination: Vec2,
    area: Option<&Bounds>,
) -> (Vec2, Vec2) {
    let Some(area) = area else {
        return (destination, Vec2::ZERO);
    };
    let Some(origin) = world.get(root).map(|e| e.position) else {
        return (destination, Vec2::ZERO);
    };
    let moved = stack_world_bounds(world, root).translate(destination - origin);
    let delta = clamp_delta(&moved, area);
    (destination + delta, delta)
}
