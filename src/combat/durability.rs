//! Resource durability
//!
//! Resources are not combatants. They carry a single durability counter that
//! starts from the definition template the first time something hits them.

use crate::entity::instance::Entity;

pub trait Durable {
    /// Remaining durability, `None` until the first hit
    fn durability(&self) -> Option<f32>;

    /// Apply one hit; true when durability has run out
    fn strike(&mut self, amount: f32) -> bool;
}

impl Durable for Entity {
    fn durability(&self) -> Option<f32> {
        self.durability
    }

    fn strike(&mut self, amount: f32) -> bool {
        let initial = self.definition.stats.durability;
        let remaining = self.durability.get_or_insert(initial);
        *remaining = (*remaining - amount.max(0.0)).max(0.0);
        *remaining <= 0.0
    }
}
