pub mod config;
pub mod error;
pub mod suspend;
pub mod types;

pub use config::{AgentParams, PlacementConfig, SimulationConfig, StackConfig};
pub use error::{Result, TableError};
pub use suspend::Suspendable;
pub use types::{Bounds, EntityId, SimTime, Vec2, ZoneId};
