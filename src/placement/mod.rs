//! Player drag/drop: merge, split, equip and bounce on release

pub mod controller;
pub mod equip;

pub use controller::{BounceReason, DropOutcome, GesturePhase, PlacementController};
pub use equip::{equip, equip_roles, EquipOutcome};
