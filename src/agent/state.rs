//! Agent state: FSM state, cached target, pacing and boundary memory

use serde::{Deserialize, Serialize};

use crate::anim::TimelineId;
use crate::core::suspend::Suspendable;
use crate::core::types::{EntityId, SimTime, Vec2};
use crate::entity::definition::Faction;
use crate::spatial::BoundarySide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentState {
    #[default]
    Patrol,
    ChaseResource,
    ChaseRival,
    AttackRival,
    AttackResource,
}

impl AgentState {
    pub fn is_rival_state(&self) -> bool {
        matches!(self, AgentState::ChaseRival | AgentState::AttackRival)
    }
}

/// A play-area edge the agent ran into recently
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryMemory {
    pub side: BoundarySide,
    pub expires_at: SimTime,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub entity: EntityId,
    pub faction: Faction,
    pub state: AgentState,
    pub target: Option<EntityId>,
    /// Patrol direction carried from hop to hop
    pub heading: Vec2,
    pub(crate) boundary_memory: Vec<BoundaryMemory>,
    /// Earliest time the next hop may start
    pub(crate) next_hop_at: SimTime,
    pub(crate) hop: Option<TimelineId>,
    pub(crate) last_attack_at: Option<SimTime>,
    suspended: bool,
}

impl Agent {
    pub fn new(entity: EntityId, faction: Faction) -> Self {
        Self {
            entity,
            faction,
            state: AgentState::Patrol,
            target: None,
            heading: Vec2::ZERO,
            boundary_memory: Vec::new(),
            next_hop_at: 0.0,
            hop: None,
            last_attack_at: None,
            suspended: false,
        }
    }

    /// Switch state; returns `(from, to)` when it actually changed
    pub fn transition(&mut self, to: AgentState) -> Option<(AgentState, AgentState)> {
        if self.state == to {
            return None;
        }
        let from = self.state;
        self.state = to;
        Some((from, to))
    }

    pub fn remember(&mut self, side: BoundarySide, expires_at: SimTime) {
        match self.boundary_memory.iter_mut().find(|m| m.side == side) {
            Some(memory) => memory.expires_at = expires_at,
            None => self.boundary_memory.push(BoundaryMemory { side, expires_at }),
        }
    }

    pub fn forget_expired(&mut self, now: SimTime) {
        self.boundary_memory.retain(|m| m.expires_at > now);
    }

    pub fn remembered_sides(&self) -> Vec<BoundarySide> {
        self.boundary_memory.iter().map(|m| m.side).collect()
    }

    pub fn cooldown_ready(&self, now: SimTime, cooldown: f32) -> bool {
        self.last_attack_at.map_or(true, |t| now - t >= cooldown)
    }

    pub fn hop_in_flight(&self) -> bool {
        self.hop.is_some()
    }

    /// Forget the cached target; the next tick re-acquires one
    pub fn clear_target(&mut self) {
        self.target = None;
    }
}

impl Suspendable for Agent {
    fn suspend(&mut self) {
        self.suspended = true;
    }

    fn resume(&mut self) {
        self.suspended = false;
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }
}
