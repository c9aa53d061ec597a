//! The table: every piece of shared mutable state the core works on
//!
//! World, zones and timelines are the only shared structures. They are
//! constructed here and handed down explicitly, never reached through
//! globals, and all of them are released by `reset_state`.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::anim::{Completion, Motion, TimelineId, Timelines};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{Bounds, EntityId, SimTime, Vec2};
use crate::entity::{DefinitionCatalog, Entity, EntityDefinition};
use crate::simulation::events::{TableEventKind, TableEventLog};
use crate::spatial::{clamp_to_area, raise_position_changed, ZoneChange};
use crate::stack::{get_root, present_stack, NullPresenter, StackPresenter};
use crate::world::World;
use crate::zone::{ZoneNotice, ZoneRegistry};

pub struct Table {
    pub config: SimulationConfig,
    pub world: World,
    pub zones: ZoneRegistry,
    pub timelines: Timelines,
    pub catalog: DefinitionCatalog,
    pub events: TableEventLog,
    pub presenter: Box<dyn StackPresenter>,
    pub rng: ChaCha8Rng,
    pub now: SimTime,
}

impl Table {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_presenter(config, Box::new(NullPresenter))
    }

    pub fn with_presenter(config: SimulationConfig, presenter: Box<dyn StackPresenter>) -> Self {
        Self {
            world: World::new(config.stack.top_offset),
            zones: ZoneRegistry::new(),
            timelines: Timelines::new(),
            catalog: DefinitionCatalog::new(),
            events: TableEventLog::new(),
            presenter,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            now: 0.0,
            config,
        }
    }

    /// `None` means an unbounded table
    pub fn play_area(&self) -> Option<Bounds> {
        self.config.play_area
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.world.get(id)
    }

    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        self.world.get(id).map(|e| e.position)
    }

    pub fn log(&mut self, kind: TableEventKind) {
        self.events.push(kind, self.now);
    }

    /// Place a new singleton and classify it against the zones
    pub fn spawn(&mut self, definition: Arc<EntityDefinition>, position: Vec2) -> EntityId {
        let id = self.world.spawn(definition, position);
        present_stack(&self.world, id, self.presenter.as_mut());
        self.raise_position_changed(id);
        id
    }

    pub fn spawn_key(&mut self, key: &str, position: Vec2) -> Result<EntityId> {
        let definition = self.catalog.get(key)?;
        Ok(self.spawn(definition, position))
    }

    /// Recompute the stack's zone and forward what the zones reported
    pub fn raise_position_changed(&mut self, id: EntityId) {
        if let Some((change, notices)) = raise_position_changed(&mut self.world, &mut self.zones, id) {
            self.report_zone_change(change, notices);
        }
    }

    fn report_zone_change(&mut self, change: ZoneChange, notices: Vec<ZoneNotice>) {
        if change.changed() {
            self.log(TableEventKind::ZoneChanged {
                root: change.root,
                previous: change.previous,
                current: change.current,
            });
        }
        self.forward_notices(notices);
    }

    pub(crate) fn forward_notices(&mut self, notices: Vec<ZoneNotice>) {
        for notice in notices {
            match notice {
                ZoneNotice::CraftAvailable { zone, recipe } => {
                    tracing::debug!(?zone, ?recipe, "craft availability changed");
                    self.log(TableEventKind::CraftAvailable { zone, recipe });
                }
            }
        }
    }

    /// Resume point after any automatic move: clamp into the play area,
    /// then refresh zones once
    pub fn settle(&mut self, id: EntityId) {
        let Some(root) = get_root(&self.world, id) else {
            return;
        };
        let area = self.play_area();
        match clamp_to_area(&mut self.world, &mut self.zones, root, area.as_ref()) {
            Some((change, notices)) => self.report_zone_change(change, notices),
            None => self.raise_position_changed(root),
        }
    }

    /// Animate a stack's root toward `to`, replacing any move already running
    pub fn animate_stack_to(
        &mut self,
        root: EntityId,
        to: Vec2,
        duration: f32,
        completion: Completion,
    ) -> Option<TimelineId> {
        let from = self.position(root)?;
        self.cancel_moves(root);
        Some(
            self.timelines
                .start(Motion::MoveStack { root, from, to }, duration, completion),
        )
    }

    /// Stop any move carrying the stack; holds (strike locks, pauses) play on
    pub fn cancel_moves(&mut self, root: EntityId) {
        let running: Vec<TimelineId> = self
            .timelines
            .iter()
            .filter(|t| matches!(t.motion, Motion::MoveStack { root: r, .. } if r == root))
            .map(|t| t.id)
            .collect();
        for id in running {
            self.timelines.cancel(id);
        }
    }

    /// The single destruction path: timelines dropped, linkage repaired,
    /// presentation and zones refreshed
    pub fn destroy(&mut self, id: EntityId) -> Option<Entity> {
        let root = get_root(&self.world, id)?;
        let zone = self.world.get(root).and_then(|e| e.current_zone);
        let survivor = if root == id {
            self.world.get(root).and_then(|e| e.members().get(1).copied())
        } else {
            Some(root)
        };
        self.timelines.cancel_for(id);

        let removed = self.world.despawn(id)?;

        if let Some(survivor) = survivor.filter(|s| self.world.contains(*s)) {
            present_stack(&self.world, survivor, self.presenter.as_mut());
        }
        if let Some(zone) = zone {
            let notices: Vec<ZoneNotice> = self.zones.refresh(zone, &self.world).into_iter().collect();
            self.forward_notices(notices);
        }

        tracing::debug!(entity = %id, key = %removed.definition.key, "entity despawned");
        self.log(TableEventKind::EntityDespawned { entity: id });
        Some(removed)
    }

    /// Drop everything the table holds; the next run starts from a blank slate
    pub fn reset_state(&mut self) {
        self.world.clear();
        self.zones.reset_state();
        self.timelines.reset_state();
        self.events.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.now = 0.0;
    }
}
