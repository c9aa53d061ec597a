//! Deckfield - card-table simulation core
//!
//! Stacks of same-kind pieces, zones that react to what sits in them,
//! a drag/drop placement controller and autonomous agents, all driven one
//! frame at a time by a `Session`.

pub mod agent;
pub mod anim;
pub mod combat;
pub mod core;
pub mod entity;
pub mod placement;
pub mod simulation;
pub mod spatial;
pub mod stack;
pub mod world;
pub mod zone;
