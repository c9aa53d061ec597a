//! Table event log
//!
//! Structural changes, zone moves and combat outcomes are appended here as
//! they happen; the host drains the log once per frame.

use serde::{Deserialize, Serialize};

use crate::agent::state::AgentState;
use crate::core::types::{EntityId, SimTime, ZoneId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableEventKind {
    StackMerged { root: EntityId, size: usize },
    StackSplit { root: EntityId, extracted: EntityId },
    EntitiesEjected { from: EntityId, ejected: Vec<EntityId> },
    EntityDespawned { entity: EntityId },
    ZoneChanged { root: EntityId, previous: Option<ZoneId>, current: Option<ZoneId> },
    AttackRequested { attacker: EntityId, defender: EntityId },
    ResourceStruck { attacker: EntityId, resource: EntityId, remaining: f32 },
    HpChanged { entity: EntityId, hp: f32 },
    EntityDied { entity: EntityId },
    Equipped { holder: EntityId, item: String, replaced: Option<EntityId> },
    CraftAvailable { zone: ZoneId, recipe: Option<String> },
    CraftStarted { zone: ZoneId, recipe: String },
    CraftCompleted { zone: ZoneId, output: EntityId },
    CraftCancelled { zone: ZoneId },
    AgentTransition { agent: EntityId, from: AgentState, to: AgentState },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEvent {
    pub time: SimTime,
    pub kind: TableEventKind,
}

#[derive(Debug, Clone, Default)]
pub struct TableEventLog {
    pub events: Vec<TableEvent>,
}

impl TableEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: TableEventKind, time: SimTime) {
        self.events.push(TableEvent { time, kind });
    }

    pub fn drain(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableEvent> + '_ {
        self.events.iter()
    }
}
