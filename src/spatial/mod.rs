//! Spatial queries over stacks: zone containment, boundary clamp, free slots

pub mod boundary;
pub mod containment;
pub mod slots;

pub use boundary::{clamp_delta, clamp_destination, clamp_stack, clamp_to_area, struck_sides, BoundarySide};
pub use containment::{find_containing_zone, is_area_containing, raise_position_changed, ZoneChange};
pub use slots::find_free_slot;
