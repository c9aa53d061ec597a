//! Combat resolution service
//!
//! Agents only ask for an attack; how it plays out is up to the resolver.
//! The session holds it as an optional collaborator so a table without one
//! keeps running, agents just retry discovery now and then.

use crate::combat::capability::{Combatant, DamageKind};
use crate::core::types::EntityId;
use crate::simulation::events::TableEventKind;
use crate::simulation::table::Table;

pub trait CombatResolver {
    /// Fire-and-forget attack request
    fn request_attack(&mut self, table: &mut Table, attacker: EntityId, defender: EntityId);
}

/// Applies the attacker's full attack at once
#[derive(Debug, Default)]
pub struct DirectResolver;

impl CombatResolver for DirectResolver {
    fn request_attack(&mut self, table: &mut Table, attacker: EntityId, defender: EntityId) {
        let Some(amount) = table
            .world
            .get(attacker)
            .and_then(|e| e.combat.as_ref())
            .filter(|c| c.can_attack())
            .map(|c| c.attack())
        else {
            return;
        };
        let Some(report) = table
            .world
            .get_mut(defender)
            .and_then(|e| e.combat.as_mut())
            .filter(|c| !c.is_dead())
            .map(|c| c.take_damage(amount, DamageKind::Melee))
        else {
            return;
        };

        tracing::debug!(
            attacker = %attacker,
            defender = %defender,
            dealt = report.dealt,
            hp = report.hp_after,
            "attack resolved"
        );
        table.log(TableEventKind::HpChanged {
            entity: defender,
            hp: report.hp_after,
        });
        if report.died {
            tracing::info!(entity = %defender, "combatant died");
            table.log(TableEventKind::EntityDied { entity: defender });
            table.destroy(defender);
        }
    }
}
