pub mod capability;
pub mod durability;
pub mod resolver;

pub use capability::{CombatStats, Combatant, DamageKind, DamageReport};
pub use durability::Durable;
pub use resolver::{CombatResolver, DirectResolver};
