//! Session: owns the table and every controller, drives one frame at a time
//!
//! Frame order is fixed: timelines advance, their completions are routed to
//! the matching resume functions, crafting countdowns run, then agents tick.
//! A paused session advances nothing and keeps all state for `resume`.

use std::sync::Arc;

use crate::agent::AgentSystem;
use crate::anim::Completion;
use crate::combat::resolver::{CombatResolver, DirectResolver};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, TableError};
use crate::core::suspend::Suspendable;
use crate::core::types::{EntityId, Vec2, ZoneId};
use crate::entity::EntityDefinition;
use crate::placement::{DropOutcome, PlacementController};
use crate::simulation::events::{TableEvent, TableEventKind};
use crate::simulation::table::Table;
use crate::stack::{members_including_self, StackPresenter};

pub struct Session {
    pub table: Table,
    pub placement: PlacementController,
    pub agents: AgentSystem,
    resolver: Option<Box<dyn CombatResolver>>,
    paused: bool,
}

impl Session {
    /// A session with the stock resolver wired
    pub fn new(config: SimulationConfig) -> Self {
        let mut session = Self::without_resolver(Table::new(config));
        session.set_resolver(Box::new(DirectResolver));
        session
    }

    pub fn with_presenter(config: SimulationConfig, presenter: Box<dyn StackPresenter>) -> Self {
        let mut session = Self::without_resolver(Table::with_presenter(config, presenter));
        session.set_resolver(Box::new(DirectResolver));
        session
    }

    pub fn without_resolver(table: Table) -> Self {
        Self {
            table,
            placement: PlacementController::new(),
            agents: AgentSystem::new(),
            resolver: None,
            paused: false,
        }
    }

    pub fn set_resolver(&mut self, resolver: Box<dyn CombatResolver>) {
        self.resolver = Some(resolver);
    }

    pub fn clear_resolver(&mut self) {
        self.resolver = None;
    }

    pub fn now(&self) -> f32 {
        self.table.now
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Spawn an entity and attach an agent when it belongs to a side
    pub fn spawn(&mut self, definition: Arc<EntityDefinition>, position: Vec2) -> EntityId {
        let id = self.table.spawn(definition, position);
        self.agents.register(&self.table, id);
        id
    }

    pub fn spawn_key(&mut self, key: &str, position: Vec2) -> Result<EntityId> {
        let definition = self.table.catalog.get(key)?;
        Ok(self.spawn(definition, position))
    }

    /// Deferred setup: swap an entity's definition after it was spawned
    ///
    /// An entity that gains a side gets an agent here; agents re-read the
    /// faction every tick.
    pub fn set_definition(
        &mut self,
        entity: EntityId,
        definition: Arc<EntityDefinition>,
    ) -> Result<()> {
        self.table
            .world
            .get_mut(entity)
            .ok_or(TableError::EntityNotFound(entity))?
            .set_definition(definition);
        self.agents.register(&self.table, entity);
        Ok(())
    }

    pub fn destroy(&mut self, entity: EntityId) -> bool {
        self.agents.deregister(entity);
        self.table.destroy(entity).is_some()
    }

    pub fn begin_drag(&mut self, entity: EntityId, split_modifier: bool) -> Result<EntityId> {
        self.placement.begin_drag(&mut self.table, entity, split_modifier)
    }

    pub fn drag_to(&mut self, pointer: Vec2) -> Result<()> {
        self.placement.drag_to(&mut self.table, pointer)
    }

    pub fn end_drag(&mut self) -> Result<DropOutcome> {
        self.placement.end_drag(&mut self.table)
    }

    /// Advance one frame by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.table.now += dt;

        let completions = self.table.timelines.advance(dt, &mut self.table.world);
        for completion in completions {
            self.dispatch(completion);
        }

        for (zone, recipe) in self.table.zones.advance_crafts(dt) {
            self.complete_craft(zone, recipe);
        }

        self.agents.tick(&mut self.table, &mut self.resolver);
    }

    fn dispatch(&mut self, completion: Completion) {
        match completion {
            Completion::Nothing => {}
            Completion::Settle(root) => self.table.settle(root),
            Completion::HopFinished(agent) => self.agents.on_hop_finished(&mut self.table, agent),
            Completion::ReleaseAttackLock(agent) => self.agents.release_attack_lock(agent),
        }
    }

    /// The explicit player trigger for a crafting zone
    pub fn start_craft(&mut self, zone: ZoneId) -> Result<Option<String>> {
        let recipes = self.table.zones.recipes().clone();
        let state = self
            .table
            .zones
            .get_mut(zone)
            .ok_or(TableError::ZoneNotFound(zone))?
            .crafting_state_mut()
            .ok_or(TableError::ZoneNotFound(zone))?;
        let Some(index) = state.start(&recipes) else {
            return Ok(None);
        };
        let name = recipes.get(index).map(|r| r.name.clone()).unwrap_or_default();
        tracing::info!(?zone, recipe = %name, "craft started");
        self.table.log(TableEventKind::CraftStarted {
            zone,
            recipe: name.clone(),
        });
        Ok(Some(name))
    }

    /// Consume the recipe inputs from the zone and drop the output at its
    /// centre; a zone that no longer holds the inputs cancels instead
    fn complete_craft(&mut self, zone_id: ZoneId, recipe_index: usize) {
        let Some(recipe) = self.table.zones.recipes().get(recipe_index).cloned() else {
            return;
        };
        let Some(zone) = self.table.zones.get(zone_id) else {
            return;
        };
        let center = zone.area.center();
        let occupants = zone.occupants(&self.table.world);
        if !recipe.is_satisfied_by(&zone.contents(&self.table.world)) {
            tracing::debug!(zone = ?zone_id, recipe = %recipe.name, "craft inputs gone");
            self.table.log(TableEventKind::CraftCancelled { zone: zone_id });
            return;
        }

        let mut consumed = Vec::new();
        for input in &recipe.inputs {
            let matching = occupants
                .iter()
                .flat_map(|root| members_including_self(&self.table.world, *root))
                .filter(|id| {
                    self.table
                        .entity(*id)
                        .is_some_and(|e| e.definition.key == input.key)
                })
                .filter(|id| !consumed.contains(id))
                .take(input.count)
                .collect::<Vec<_>>();
            consumed.extend(matching);
        }
        // top members first so roots are removed last
        for id in consumed.into_iter().rev() {
            self.destroy(id);
        }

        match self.spawn_key(&recipe.output, center) {
            Ok(output) => {
                self.table.settle(output);
                tracing::info!(zone = ?zone_id, output = %recipe.output, "craft completed");
                self.table.log(TableEventKind::CraftCompleted {
                    zone: zone_id,
                    output,
                });
            }
            Err(err) => tracing::warn!(error = %err, recipe = %recipe.name, "craft output unknown"),
        }
    }

    /// Bulk-suspend one entity's autonomous behaviour (airdrop)
    pub fn suspend_entity(&mut self, entity: EntityId) {
        self.agents.suspend_entity(entity);
        self.table.timelines.suspend_for(entity);
    }

    pub fn resume_entity(&mut self, entity: EntityId) {
        self.agents.resume_entity(entity);
        self.table.timelines.resume_for(entity);
    }

    fn for_each_suspendable(&mut self, mut f: impl FnMut(&mut dyn Suspendable)) {
        self.agents.suspendables_mut().for_each(&mut f);
        self.table.timelines.suspendables_mut().for_each(&mut f);
        self.table.zones.suspendables_mut().for_each(&mut f);
    }

    /// Drain events appended since the last call
    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        self.table.events.drain()
    }

    /// Hard reset for a new run, regardless of pause state
    pub fn reset_state(&mut self) {
        self.placement.reset_state(&mut self.table);
        self.agents.reset_state();
        self.table.reset_state();
        self.paused = false;
        tracing::info!("session reset");
    }
}

impl Suspendable for Session {
    fn suspend(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.for_each_suspendable(|s| s.suspend());
        tracing::debug!("session paused");
    }

    fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.for_each_suspendable(|s| s.resume());
        tracing::debug!("session resumed");
    }

    fn is_suspended(&self) -> bool {
        self.paused
    }
}
