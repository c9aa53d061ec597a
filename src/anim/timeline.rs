//! Timelines - the multi-frame suspension points of the core
//!
//! Movement, strike lunges and pacing pauses take time. Each is a timeline
//! with exactly one `Completion`; `advance` hands back the completions that
//! fired and the session routes them to explicit resume functions (settle a
//! stack, finish a hop, release an attack lock). Easing is not modelled,
//! moves interpolate linearly.

use crate::core::suspend::Suspendable;
use crate::core::types::{EntityId, Vec2};
use crate::stack::move_stack_to;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Carry a stack's root from `from` to `to`; members follow offsets
    MoveStack { root: EntityId, from: Vec2, to: Vec2 },
    /// Pure delay bound to an entity (strike animation, pacing)
    Hold { entity: EntityId },
}

impl Motion {
    pub fn entity(&self) -> EntityId {
        match self {
            Motion::MoveStack { root, .. } => *root,
            Motion::Hold { entity } => *entity,
        }
    }
}

/// What to do once a timeline plays out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Nothing,
    /// Clamp to the play area and refresh zones
    Settle(EntityId),
    /// An agent's movement hop landed
    HopFinished(EntityId),
    /// An attacker's strike animation ended
    ReleaseAttackLock(EntityId),
}

#[derive(Debug, Clone)]
pub struct Timeline {
    pub id: TimelineId,
    pub motion: Motion,
    pub duration: f32,
    pub completion: Completion,
    elapsed: f32,
    suspended: bool,
}

impl Timeline {
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }
}

impl Suspendable for Timeline {
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

#[derive(Debug, Clone, Default)]
pub struct Timelines {
    active: Vec<Timeline>,
    next_id: u64,
}

impl Timelines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, motion: Motion, duration: f32, completion: Completion) -> TimelineId {
        let id = TimelineId(self.next_id);
        self.next_id += 1;
        self.active.push(Timeline {
            id,
            motion,
            duration,
            completion,
            elapsed: 0.0,
            suspended: false,
        });
        id
    }

    pub fn get(&self, id: TimelineId) -> Option<&Timeline> {
        self.active.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timeline> + '_ {
        self.active.iter()
    }

    pub fn is_active(&self, id: TimelineId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop a timeline without firing its completion
    pub fn cancel(&mut self, id: TimelineId) -> bool {
        let before = self.active.len();
        self.active.retain(|t| t.id != id);
        before != self.active.len()
    }

    /// Cancel everything bound to `entity`; none of it completes
    pub fn cancel_for(&mut self, entity: EntityId) -> usize {
        let before = self.active.len();
        self.active.retain(|t| t.motion.entity() != entity);
        before - self.active.len()
    }

    pub fn suspend_for(&mut self, entity: EntityId) {
        self.for_entity(entity, |t| t.suspend());
    }

    pub fn resume_for(&mut self, entity: EntityId) {
        self.for_entity(entity, |t| t.resume());
    }

    fn for_entity(&mut self, entity: EntityId, mut f: impl FnMut(&mut Timeline)) {
        self.active
            .iter_mut()
            .filter(|t| t.motion.entity() == entity)
            .for_each(|t| f(t));
    }

    pub fn suspendables_mut(&mut self) -> impl Iterator<Item = &mut dyn Suspendable> + '_ {
        self.active.iter_mut().map(|t| t as &mut dyn Suspendable)
    }

    /// Play every running timeline forward and collect finished completions
    ///
    /// Timelines whose entity no longer exists are dropped silently.
    pub fn advance(&mut self, dt: f32, world: &mut World) -> Vec<Completion> {
        let mut finished = Vec::new();
        self.active.retain_mut(|timeline| {
            if !world.contains(timeline.motion.entity()) {
                return false;
            }
            if timeline.suspended {
                return true;
            }
            timeline.elapsed += dt;
            let t = timeline.progress();
            if let Motion::MoveStack { root, from, to } = timeline.motion {
                move_stack_to(world, root, from.lerp(&to, t));
            }
            if t >= 1.0 {
                finished.push(timeline.completion);
                false
            } else {
                true
            }
        });
        finished
    }

    /// Release every timeline; nothing completes
    pub fn reset_state(&mut self) {
        self.active.clear();
    }
}
