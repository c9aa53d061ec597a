//! Agent system: ticks every agent's state machine once per frame
//!
//! A rival in range preempts whatever the agent was doing. Without one the
//! agent works through Patrol -> ChaseResource -> AttackResource and falls
//! back to Patrol whenever its target goes stale. Movement is hop-paced: one
//! hop timeline at a time, each destination pre-clamped so the whole stack
//! stays on the table, then a pause before the next.

use ahash::AHashSet;

use crate::agent::patrol::next_heading;
use crate::agent::state::{Agent, AgentState};
use crate::agent::targeting::{find_resource, find_rival, position_of, resource_distance};
use crate::anim::{Completion, Motion};
use crate::combat::capability::Combatant;
use crate::combat::durability::Durable;
use crate::combat::resolver::CombatResolver;
use crate::core::config::AgentParams;
use crate::core::suspend::Suspendable;
use crate::core::types::{EntityId, SimTime, Vec2};
use crate::entity::definition::Faction;
use crate::simulation::events::TableEventKind;
use crate::simulation::table::Table;
use crate::spatial::{clamp_destination, struck_sides};

/// Tracks whether the combat resolver is wired, checking at a low rate
/// while it's missing and warning only once
#[derive(Debug, Default)]
struct ResolverLink {
    missing: bool,
    warned: bool,
    next_check: SimTime,
}

impl ResolverLink {
    fn available(&mut self, present: bool, now: SimTime, retry_interval: f32) -> bool {
        if self.missing && now < self.next_check {
            return false;
        }
        if present {
            if self.missing {
                tracing::info!("combat resolver available again");
            }
            self.missing = false;
            return true;
        }
        if !self.warned {
            tracing::warn!("no combat resolver wired, rival attacks disabled until one is");
            self.warned = true;
        }
        self.missing = true;
        self.next_check = now + retry_interval;
        false
    }
}

#[derive(Debug, Default)]
pub struct AgentSystem {
    agents: Vec<Agent>,
    /// Attackers whose strike animation is still playing
    attack_locks: AHashSet<EntityId>,
    resolver_link: ResolverLink,
}

impl AgentSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an agent if the entity belongs to a side; returns whether one
    /// is attached afterwards
    pub fn register(&mut self, table: &Table, entity: EntityId) -> bool {
        if self.get(entity).is_some() {
            return true;
        }
        let Some(faction) = table.entity(entity).map(|e| e.faction()) else {
            return false;
        };
        if faction == Faction::None {
            return false;
        }
        tracing::debug!(entity = %entity, ?faction, "agent registered");
        self.agents.push(Agent::new(entity, faction));
        true
    }

    pub fn deregister(&mut self, entity: EntityId) -> Option<Agent> {
        let index = self.agents.iter().position(|a| a.entity == entity)?;
        self.attack_locks.remove(&entity);
        Some(self.agents.remove(index))
    }

    pub fn get(&self, entity: EntityId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.entity == entity)
    }

    fn get_mut(&mut self, entity: EntityId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.entity == entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn is_locked(&self, entity: EntityId) -> bool {
        self.attack_locks.contains(&entity)
    }

    pub fn suspend_entity(&mut self, entity: EntityId) {
        if let Some(agent) = self.get_mut(entity) {
            agent.suspend();
        }
    }

    pub fn resume_entity(&mut self, entity: EntityId) {
        if let Some(agent) = self.get_mut(entity) {
            agent.resume();
        }
    }

    pub fn suspendables_mut(&mut self) -> impl Iterator<Item = &mut dyn Suspendable> + '_ {
        self.agents.iter_mut().map(|a| a as &mut dyn Suspendable)
    }

    /// Forget every agent, lock and resolver state
    pub fn reset_state(&mut self) {
        self.agents.clear();
        self.attack_locks.clear();
        self.resolver_link = ResolverLink::default();
    }

    /// Resume point for a finished hop: settle, then pause before the next
    pub fn on_hop_finished(&mut self, table: &mut Table, entity: EntityId) {
        table.settle(entity);
        let pause = table.config.agent.hop_pause;
        if let Some(agent) = self.get_mut(entity) {
            agent.hop = None;
            agent.next_hop_at = table.now + pause;
        }
    }

    pub fn release_attack_lock(&mut self, entity: EntityId) {
        self.attack_locks.remove(&entity);
    }

    /// Run every agent's state machine once
    pub fn tick(&mut self, table: &mut Table, resolver: &mut Option<Box<dyn CombatResolver>>) {
        self.prune(table);
        let params = table.config.agent.clone();
        for index in 0..self.agents.len() {
            let Some(agent) = self.agents.get_mut(index) else {
                break;
            };
            if agent.is_suspended() {
                continue;
            }
            let mut ctx = TickContext {
                table: &mut *table,
                resolver: &mut *resolver,
                locks: &mut self.attack_locks,
                link: &mut self.resolver_link,
                params: &params,
            };
            ctx.tick_agent(agent);
        }
        self.prune(table);
    }

    /// Drop agents whose entity is gone
    fn prune(&mut self, table: &Table) {
        let locks = &mut self.attack_locks;
        self.agents.retain(|a| {
            let alive = table.world.contains(a.entity);
            if !alive {
                locks.remove(&a.entity);
            }
            alive
        });
    }
}

struct TickContext<'a> {
    table: &'a mut Table,
    resolver: &'a mut Option<Box<dyn CombatResolver>>,
    locks: &'a mut AHashSet<EntityId>,
    link: &'a mut ResolverLink,
    params: &'a AgentParams,
}

impl TickContext<'_> {
    fn tick_agent(&mut self, agent: &mut Agent) {
        let Some(entity) = self.table.entity(agent.entity) else {
            return;
        };
        if entity.dragging || !entity.is_root() {
            return;
        }
        agent.faction = entity.faction();
        if agent.faction == Faction::None {
            self.abandon(agent, AgentState::Patrol);
            return;
        }

        agent.forget_expired(self.table.now);
        if let Some(hop) = agent.hop {
            if !self.table.timelines.is_active(hop) {
                agent.hop = None;
            }
        }

        if self.preempt_for_rival(agent) {
            return;
        }
        if agent.state.is_rival_state() {
            self.abandon(agent, AgentState::Patrol);
        }

        match agent.state {
            AgentState::Patrol => {
                if let Some((resource, _)) = self.find_resource(agent) {
                    agent.target = Some(resource);
                    self.transition(agent, AgentState::ChaseResource);
                    self.chase_resource(agent);
                } else {
                    self.patrol(agent);
                }
            }
            AgentState::ChaseResource => self.chase_resource(agent),
            AgentState::AttackResource => self.attack_resource(agent),
            AgentState::ChaseRival | AgentState::AttackRival => {}
        }
    }

    fn preempt_for_rival(&mut self, agent: &mut Agent) -> bool {
        let area = self.table.play_area();
        let Some((rival, distance)) = find_rival(
            &self.table.world,
            agent.entity,
            agent.faction,
            self.params.search_radius,
            area.as_ref(),
        ) else {
            return false;
        };

        if !agent.state.is_rival_state() || agent.target != Some(rival) {
            self.cancel_hop(agent);
        }
        agent.target = Some(rival);

        if distance <= self.params.attack_range {
            self.transition(agent, AgentState::AttackRival);
            self.cancel_hop(agent);
            self.attack_rival(agent, rival);
        } else {
            self.transition(agent, AgentState::ChaseRival);
            if let Some(goal) = position_of(&self.table.world, rival) {
                self.hop_toward(agent, goal, self.params.attack_range);
            }
        }
        true
    }

    fn find_resource(&self, agent: &Agent) -> Option<(EntityId, f32)> {
        let area = self.table.play_area();
        find_resource(
            &self.table.world,
            agent.entity,
            self.params.search_radius,
            area.as_ref(),
        )
    }

    fn target_distance(&self, agent: &Agent) -> Option<f32> {
        let area = self.table.play_area();
        resource_distance(&self.table.world, agent.entity, agent.target?, area.as_ref())
    }

    fn chase_resource(&mut self, agent: &mut Agent) {
        let Some(distance) = self.target_distance(agent) else {
            self.abandon(agent, AgentState::Patrol);
            return;
        };
        if distance <= self.params.stop_distance {
            self.cancel_hop(agent);
            self.transition(agent, AgentState::AttackResource);
            return;
        }
        let goal = agent.target.and_then(|t| position_of(&self.table.world, t));
        if let Some(goal) = goal {
            self.hop_toward(agent, goal, self.params.stop_distance);
        }
    }

    fn attack_resource(&mut self, agent: &mut Agent) {
        let Some(distance) = self.target_distance(agent) else {
            self.abandon(agent, AgentState::Patrol);
            return;
        };
        if distance > self.params.stop_distance {
            self.transition(agent, AgentState::ChaseResource);
            return;
        }
        let Some(target) = agent.target else {
            return;
        };
        if !self.strike_ready(agent) {
            return;
        }

        let amount = self
            .table
            .entity(agent.entity)
            .and_then(|e| e.combat.as_ref())
            .map_or(1.0, |c| c.attack());
        self.lock_attacker(agent);

        let Some(resource) = self.table.world.get_mut(target) else {
            return;
        };
        let depleted = resource.strike(amount);
        let remaining = resource.durability().unwrap_or(0.0);
        tracing::debug!(agent = %agent.entity, resource = %target, remaining, "resource struck");
        self.table.log(TableEventKind::ResourceStruck {
            attacker: agent.entity,
            resource: target,
            remaining,
        });
        if depleted {
            self.table.destroy(target);
            self.abandon(agent, AgentState::Patrol);
        }
    }

    fn attack_rival(&mut self, agent: &mut Agent, rival: EntityId) {
        if !self.strike_ready(agent) {
            return;
        }
        let now = self.table.now;
        if !self
            .link
            .available(self.resolver.is_some(), now, self.params.resolver_retry_interval)
        {
            return;
        }
        self.lock_attacker(agent);
        self.table.log(TableEventKind::AttackRequested {
            attacker: agent.entity,
            defender: rival,
        });
        if let Some(resolver) = self.resolver.as_mut() {
            resolver.request_attack(self.table, agent.entity, rival);
        }
    }

    /// Cooldown elapsed and no strike animation still playing
    fn strike_ready(&self, agent: &Agent) -> bool {
        agent.cooldown_ready(self.table.now, self.params.attack_cooldown)
            && !self.locks.contains(&agent.entity)
    }

    fn lock_attacker(&mut self, agent: &mut Agent) {
        agent.last_attack_at = Some(self.table.now);
        self.locks.insert(agent.entity);
        self.table.timelines.start(
            Motion::Hold {
                entity: agent.entity,
            },
            self.params.attack_lock_duration,
            Completion::ReleaseAttackLock(agent.entity),
        );
    }

    fn patrol(&mut self, agent: &mut Agent) {
        if agent.hop_in_flight() || self.table.now < agent.next_hop_at {
            return;
        }
        let avoid = agent.remembered_sides();
        agent.heading = next_heading(agent.heading, self.params, &avoid, &mut self.table.rng);
        let Some(origin) = position_of(&self.table.world, agent.entity) else {
            return;
        };
        let goal = origin + agent.heading * self.params.hop_distance;
        self.start_hop(agent, origin, goal);
    }

    /// One paced hop toward `goal`, stopping `keep_distance` short of it
    fn hop_toward(&mut self, agent: &mut Agent, goal: Vec2, keep_distance: f32) {
        if agent.hop_in_flight() || self.table.now < agent.next_hop_at {
            return;
        }
        let Some(origin) = position_of(&self.table.world, agent.entity) else {
            return;
        };
        let offset = goal - origin;
        let step = self
            .params
            .hop_distance
            .min(offset.length() - keep_distance * 0.5);
        if step <= 0.0 {
            return;
        }
        self.start_hop(agent, origin, origin + offset.normalize() * step);
    }

    fn start_hop(&mut self, agent: &mut Agent, origin: Vec2, goal: Vec2) {
        let area = self.table.play_area();
        let (destination, correction) =
            clamp_destination(&self.table.world, agent.entity, goal, area.as_ref());
        let expires_at = self.table.now + self.params.boundary_memory_ttl;
        for side in struck_sides(correction) {
            agent.remember(side, expires_at);
        }
        let travelled = destination - origin;
        if !travelled.is_zero() && agent.state == AgentState::Patrol {
            agent.heading = travelled.normalize();
        }
        if destination.distance(&origin) <= f32::EPSILON {
            return;
        }
        agent.hop = self.table.animate_stack_to(
            agent.entity,
            destination,
            self.params.hop_duration,
            Completion::HopFinished(agent.entity),
        );
    }

    /// Drop the in-flight hop and settle wherever the stack got to
    fn cancel_hop(&mut self, agent: &mut Agent) {
        if let Some(hop) = agent.hop.take() {
            if self.table.timelines.cancel(hop) {
                self.table.settle(agent.entity);
            }
        }
    }

    fn abandon(&mut self, agent: &mut Agent, to: AgentState) {
        agent.clear_target();
        self.cancel_hop(agent);
        self.transition(agent, to);
    }

    fn transition(&mut self, agent: &mut Agent, to: AgentState) {
        if let Some((from, to)) = agent.transition(to) {
            tracing::debug!(agent = %agent.entity, ?from, ?to, "agent transition");
            self.table.log(TableEventKind::AgentTransition {
                agent: agent.entity,
                from,
                to,
            });
        }
    }
}
