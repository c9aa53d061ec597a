pub mod catalog;
pub mod definition;
pub mod instance;

pub use catalog::DefinitionCatalog;
pub use definition::{EntityDefinition, Faction, StatsTemplate, Tag};
pub use instance::{Collider, Entity};
