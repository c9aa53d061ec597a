//! Patrol wandering: inertial heading plus bounded jitter
//!
//! Remembered boundary sides are steered away from so an agent that just
//! bumped an edge doesn't keep pushing into it.

use std::f32::consts::TAU;

use rand::Rng;

use crate::core::config::AgentParams;
use crate::core::types::Vec2;
use crate::spatial::BoundarySide;

pub fn next_heading(
    heading: Vec2,
    params: &AgentParams,
    avoid: &[BoundarySide],
    rng: &mut impl Rng,
) -> Vec2 {
    let fresh = Vec2::from_angle(rng.gen_range(0.0..TAU));
    let jitter = if params.patrol_jitter > 0.0 {
        rng.gen_range(-params.patrol_jitter..=params.patrol_jitter)
    } else {
        0.0
    };

    let inertia = params.patrol_inertia.clamp(0.0, 1.0);
    let carried = if heading.is_zero() {
        fresh
    } else {
        heading.normalize().rotate(jitter)
    };
    let mut next = (carried * inertia + fresh * (1.0 - inertia)).normalize();
    if next.is_zero() {
        next = carried;
    }

    steer_away(next, avoid)
}

/// Flip any component that points into a remembered side
pub fn steer_away(mut heading: Vec2, avoid: &[BoundarySide]) -> Vec2 {
    for side in avoid {
        match side {
            BoundarySide::Left => heading.x = heading.x.abs(),
            BoundarySide::Right => heading.x = -heading.x.abs(),
            BoundarySide::Bottom => heading.y = heading.y.abs(),
            BoundarySide::Top => heading.y = -heading.y.abs(),
        }
    }
    heading.normalize()
}
