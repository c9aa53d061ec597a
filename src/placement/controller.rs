//! Placement controller: one pointer gesture at a time
//!
//! A gesture goes `Idle -> Dragging` on `begin_drag` and ends on `end_drag`
//! in `Idle` (placed, bounced, or waiting in a crafting zone), `MergedAway`
//! (the dragged stack joined another) or `Dissolved` (the dragged item was
//! consumed by an equip).
//!
//! Release decisions, first match wins:
//! 1. fully inside a crafting zone: stay put and wait for the player
//! 2. inside a lane but not a character stack: back to the start
//! 3. inside a lane that is full: back to the start
//! 4. no overlap with the play area at all: back to the start
//! 5. a foreign stack within the probe radius: merge, equip, or bounce apart
//! 6. anywhere else: clamp and settle

use crate::anim::Completion;
use crate::core::error::{Result, TableError};
use crate::core::types::{EntityId, Vec2, ZoneId};
use crate::placement::equip::{equip, equip_roles};
use crate::simulation::events::TableEventKind;
use crate::simulation::table::Table;
use crate::spatial::{clamp_destination, find_containing_zone};
use crate::stack::{
    can_merge, get_root, members_including_self, merge, move_stack_to, split, stack_world_bounds,
};
use crate::zone::ZoneCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
    /// Dragged stack was absorbed into another
    MergedAway,
    /// Dragged entity was consumed
    Dissolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BounceReason {
    LaneIneligible,
    LaneFull,
    OutsidePlayArea,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Resting in a crafting zone until the player triggers the craft
    AwaitingCraft { zone: ZoneId },
    /// Animating back to where the drag started
    BouncedBack { reason: BounceReason },
    Merged { root: EntityId, ejected: Vec<EntityId> },
    Equipped { holder: EntityId, replaced: Option<EntityId> },
    /// Both stacks pushed away from each other
    BouncedApart { other: EntityId },
    Placed { zone: Option<ZoneId> },
}

#[derive(Debug, Clone)]
struct Drag {
    root: EntityId,
    grabbed: EntityId,
    /// Where every member stood when the gesture began
    start: Vec<(EntityId, Vec2)>,
    /// Grabbed entity's position relative to the root
    grab_offset: Vec2,
}

#[derive(Debug, Default)]
pub struct PlacementController {
    drag: Option<Drag>,
    phase: GesturePhase,
}

impl PlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn dragged(&self) -> Option<EntityId> {
        self.drag.as_ref().map(|d| d.grabbed)
    }

    /// Pick up the stack under `entity`
    ///
    /// With `split_modifier` the top member is pulled off first and dragged
    /// alone. Returns the entity now following the pointer.
    pub fn begin_drag(
        &mut self,
        table: &mut Table,
        entity: EntityId,
        split_modifier: bool,
    ) -> Result<EntityId> {
        if self.drag.is_some() {
            return Err(TableError::GestureInProgress);
        }
        let target = table.world.get(entity).ok_or(TableError::EntityNotFound(entity))?;
        if !target.definition.is_draggable() {
            return Err(TableError::NonDraggable(entity));
        }

        let grabbed = if split_modifier {
            match split(&mut table.world, entity, table.presenter.as_mut()) {
                Some(extracted) => {
                    let remaining = get_root(&table.world, entity).unwrap_or(entity);
                    table.log(TableEventKind::StackSplit {
                        root: remaining,
                        extracted,
                    });
                    table.raise_position_changed(remaining);
                    extracted
                }
                None => entity,
            }
        } else {
            entity
        };

        let root = get_root(&table.world, grabbed).ok_or(TableError::EntityNotFound(grabbed))?;
        let members = members_including_self(&table.world, root);
        let mut start = Vec::with_capacity(members.len());
        for id in &members {
            if let Some(e) = table.world.get_mut(*id) {
                e.dragging = true;
                start.push((*id, e.position));
            }
        }
        table.cancel_moves(root);

        let root_position = table.position(root).unwrap_or_default();
        let grab_offset = table.position(grabbed).unwrap_or_default() - root_position;

        tracing::debug!(root = %root, grabbed = %grabbed, members = members.len(), "drag started");
        self.drag = Some(Drag {
            root,
            grabbed,
            start,
            grab_offset,
        });
        self.phase = GesturePhase::Dragging;
        Ok(grabbed)
    }

    /// Follow the pointer; no clamping while the drag is live
    pub fn drag_to(&mut self, table: &mut Table, pointer: Vec2) -> Result<()> {
        let drag = self.drag.as_ref().ok_or(TableError::NoGesture)?;
        move_stack_to(&mut table.world, drag.root, pointer - drag.grab_offset);
        Ok(())
    }

    /// Release the gesture and decide what the drop means
    pub fn end_drag(&mut self, table: &mut Table) -> Result<DropOutcome> {
        let drag = self.drag.take().ok_or(TableError::NoGesture)?;
        for (id, _) in &drag.start {
            if let Some(e) = table.world.get_mut(*id) {
                e.dragging = false;
            }
        }
        self.phase = GesturePhase::Idle;

        let root = drag.root;
        if !table.world.contains(root) {
            return Err(TableError::EntityNotFound(root));
        }

        let outcome = self.resolve_drop(table, &drag)?;
        tracing::debug!(root = %root, outcome = ?outcome, "drop resolved");
        Ok(outcome)
    }

    fn resolve_drop(&mut self, table: &mut Table, drag: &Drag) -> Result<DropOutcome> {
        let root = drag.root;

        let zone = find_containing_zone(&table.world, &table.zones, root).and_then(|id| {
            let zone = table.zones.get(id)?;
            Some((
                id,
                zone.category(),
                zone.is_eligible(&table.world, root),
                zone.can_accept(&table.world, root),
            ))
        });
        match zone {
            Some((zone, ZoneCategory::Crafting, _, _)) => {
                table.raise_position_changed(root);
                return Ok(DropOutcome::AwaitingCraft { zone });
            }
            Some((_, ZoneCategory::ExplorationLane, false, _)) => {
                return Ok(self.bounce_back(table, drag, BounceReason::LaneIneligible));
            }
            Some((_, ZoneCategory::ExplorationLane, true, false)) => {
                return Ok(self.bounce_back(table, drag, BounceReason::LaneFull));
            }
            _ => {}
        }

        if let Some(area) = table.play_area() {
            if !area.intersects(&stack_world_bounds(&table.world, root)) {
                return Ok(self.bounce_back(table, drag, BounceReason::OutsidePlayArea));
            }
        }

        if let Some(other) = self.probe(table, root) {
            return self.drop_onto(table, drag, other);
        }

        table.settle(root);
        let zone = table.world.get(root).and_then(|e| e.current_zone);
        Ok(DropOutcome::Placed { zone })
    }

    /// Nearest foreign root within the probe radius of the released root
    fn probe(&self, table: &Table, root: EntityId) -> Option<EntityId> {
        let origin = table.position(root)?;
        let radius = table.config.placement.merge_probe_radius;
        table
            .world
            .roots()
            .filter(|e| e.id != root && !e.dragging)
            .map(|e| (e.id, e.position.distance(&origin)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn drop_onto(&mut self, table: &mut Table, drag: &Drag, other: EntityId) -> Result<DropOutcome> {
        let root = drag.root;
        let capacity = table.config.stack.max_stack_size;

        if can_merge(&table.world, drag.grabbed, other, capacity) {
            let left_zone = table.world.get(root).and_then(|e| e.current_zone);
            let config = table.config.stack.clone();
            let outcome = merge(
                &mut table.world,
                drag.grabbed,
                other,
                Some(drag.grabbed),
                &config,
                &mut table.rng,
                table.presenter.as_mut(),
            )?;

            table.settle(outcome.root);
            let landed_zone = table.world.get(outcome.root).and_then(|e| e.current_zone);
            if let Some(zone) = left_zone.filter(|z| Some(*z) != landed_zone) {
                let notices = table.zones.refresh(zone, &table.world).into_iter().collect();
                table.forward_notices(notices);
            }
            for id in &outcome.ejected {
                table.settle(*id);
            }

            let size = members_including_self(&table.world, outcome.root).len();
            table.log(TableEventKind::StackMerged {
                root: outcome.root,
                size,
            });
            if !outcome.ejected.is_empty() {
                table.log(TableEventKind::EntitiesEjected {
                    from: outcome.root,
                    ejected: outcome.ejected.clone(),
                });
            }
            self.phase = GesturePhase::MergedAway;
            return Ok(DropOutcome::Merged {
                root: outcome.root,
                ejected: outcome.ejected,
            });
        }

        if let Some((item, holder)) = equip_roles(table, drag.grabbed, other) {
            match equip(table, item, holder) {
                Ok(outcome) => {
                    if let Some(holder_root) = get_root(&table.world, holder) {
                        table.settle(holder_root);
                    }
                    if item == drag.grabbed {
                        self.phase = GesturePhase::Dissolved;
                    }
                    return Ok(DropOutcome::Equipped {
                        holder: outcome.holder,
                        replaced: outcome.replaced,
                    });
                }
                Err(err) => {
                    tracing::debug!(error = %err, "equip rejected, bouncing apart");
                }
            }
        }

        Ok(self.bounce_apart(table, root, other))
    }

    /// Animate the whole stack back to where the gesture began
    fn bounce_back(&self, table: &mut Table, drag: &Drag, reason: BounceReason) -> DropOutcome {
        let home = drag
            .start
            .iter()
            .find(|(id, _)| *id == drag.root)
            .map(|(_, p)| *p);
        if let Some(home) = home {
            let duration = table.config.placement.return_duration;
            table.animate_stack_to(drag.root, home, duration, Completion::Settle(drag.root));
        }
        tracing::debug!(root = %drag.root, ?reason, "drop rejected");
        DropOutcome::BouncedBack { reason }
    }

    /// Push both stacks away along the line joining them
    fn bounce_apart(&self, table: &mut Table, root: EntityId, other: EntityId) -> DropOutcome {
        let (Some(a), Some(b)) = (table.position(root), table.position(other)) else {
            return DropOutcome::BouncedApart { other };
        };
        let mut direction = (a - b).normalize();
        if direction.is_zero() {
            direction = Vec2::new(1.0, 0.0);
        }
        let distance = table.config.placement.bounce_distance;
        let duration = table.config.placement.bounce_duration;
        let area = table.play_area();

        for (id, target) in [(root, a + direction * distance), (other, b - direction * distance)] {
            let (target, _) = clamp_destination(&table.world, id, target, area.as_ref());
            table.animate_stack_to(id, target, duration, Completion::Settle(id));
        }
        DropOutcome::BouncedApart { other }
    }

    /// Abandon any gesture in flight
    pub fn reset_state(&mut self, table: &mut Table) {
        if let Some(drag) = self.drag.take() {
            for (id, _) in drag.start {
                if let Some(e) = table.world.get_mut(id) {
                    e.dragging = false;
                }
            }
        }
        self.phase = GesturePhase::Idle;
    }
}
