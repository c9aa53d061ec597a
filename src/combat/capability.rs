//! Combat capability - the HP/attack bookkeeping the core depends on
//!
//! Agents and resolvers only talk to the `Combatant` trait; `CombatStats`
//! is the stock implementation attached to fighting entities.

use serde::{Deserialize, Serialize};

use crate::entity::definition::StatsTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Melee,
    Environmental,
}

/// Outcome of a damage application, doubling as the HP/death notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReport {
    pub dealt: f32,
    pub hp_after: f32,
    pub died: bool,
}

pub trait Combatant {
    fn attack(&self) -> f32;
    fn hp(&self) -> f32;
    fn max_hp(&self) -> f32;

    fn is_dead(&self) -> bool {
        self.hp() <= 0.0
    }

    fn can_attack(&self) -> bool;

    fn take_damage(&mut self, amount: f32, kind: DamageKind) -> DamageReport;

    /// Returns the HP actually restored
    fn heal(&mut self, amount: f32) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub base_attack: f32,
    /// Added by equipped items
    pub bonus_attack: f32,
    hp: f32,
    max_hp: f32,
}

impl CombatStats {
    pub fn from_template(template: &StatsTemplate) -> Self {
        Self {
            base_attack: template.attack,
            bonus_attack: 0.0,
            hp: template.max_hp,
            max_hp: template.max_hp,
        }
    }
}

impl Combatant for CombatStats {
    fn attack(&self) -> f32 {
        self.base_attack + self.bonus_attack
    }

    fn hp(&self) -> f32 {
        self.hp
    }

    fn max_hp(&self) -> f32 {
        self.max_hp
    }

    fn can_attack(&self) -> bool {
        !self.is_dead() && self.attack() > 0.0
    }

    fn take_damage(&mut self, amount: f32, _kind: DamageKind) -> DamageReport {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        DamageReport {
            dealt: before - self.hp,
            hp_after: self.hp,
            died: before > 0.0 && self.hp <= 0.0,
        }
    }

    fn heal(&mut self, amount: f32) -> f32 {
        if self.is_dead() {
            return 0.0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp);
        self.hp - before
    }
}
