//! Autonomous agents attached to faction-tagged entities

pub mod patrol;
pub mod state;
pub mod system;
pub mod targeting;

pub use state::{Agent, AgentState, BoundaryMemory};
pub use system::AgentSystem;
pub use targeting::{find_resource, find_rival};
