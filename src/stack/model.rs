//! Stack model - reading and mutating stack linkage
//!
//! A stack is not an object of its own; it's the view `{root, root.members}`.
//! An unlinked entity is a stack of one. Every mutation validates first and
//! only then touches linkage, so a rejected call leaves the arena exactly as
//! it found it.

use rand::Rng;

use crate::core::config::StackConfig;
use crate::core::error::{Result, TableError};
use crate::core::types::{Bounds, EntityId, Vec2};
use crate::stack::presenter::{roles_for, StackPresenter};
use crate::world::World;

/// Result of merging two stacks
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub root: EntityId,
    /// Entities that didn't fit and now stand alone
    pub ejected: Vec<EntityId>,
}

/// `e.root ?? e`
pub fn get_root(world: &World, id: EntityId) -> Option<EntityId> {
    world.get(id).map(|e| e.root().unwrap_or(id))
}

/// Root's members bottom to top, or `[root]` for a singleton
pub fn members_including_self(world: &World, id: EntityId) -> Vec<EntityId> {
    let Some(root_id) = get_root(world, id) else {
        return Vec::new();
    };
    match world.get(root_id) {
        Some(root) if !root.members().is_empty() => root.members().to_vec(),
        Some(_) => vec![root_id],
        None => Vec::new(),
    }
}

pub fn stack_len(world: &World, id: EntityId) -> usize {
    members_including_self(world, id).len()
}

pub fn same_stack(world: &World, a: EntityId, b: EntityId) -> bool {
    match (get_root(world, a), get_root(world, b)) {
        (Some(ra), Some(rb)) => ra == rb,
        _ => false,
    }
}

/// Union of every enabled member collider
///
/// Falls back to a zero-size box at the root position when no member
/// currently exposes collision.
pub fn stack_world_bounds(world: &World, root: EntityId) -> Bounds {
    let members = members_including_self(world, root);
    let union = members
        .iter()
        .filter_map(|id| world.get(*id).and_then(|e| e.bounds()))
        .reduce(|acc, b| acc.union(&b));

    union.unwrap_or_else(|| {
        let origin = get_root(world, root)
            .and_then(|r| world.get(r))
            .map(|e| e.position)
            .unwrap_or_default();
        Bounds::point(origin)
    })
}

/// Shift every member of the stack by `delta`
pub fn translate_stack(world: &mut World, id: EntityId, delta: Vec2) {
    for member in members_including_self(world, id) {
        if let Some(entity) = world.get_mut(member) {
            entity.position += delta;
        }
    }
}

/// Place the root at `position`; members follow their offsets
pub fn move_stack_to(world: &mut World, id: EntityId, position: Vec2) {
    let Some(root) = get_root(world, id) else {
        return;
    };
    if let Some(entity) = world.get_mut(root) {
        entity.position = position;
    }
    world.relayout_stack(root);
}

/// Push the current roles of every member to the presenter
pub fn present_stack(world: &World, id: EntityId, presenter: &mut dyn StackPresenter) {
    let members = members_including_self(world, id);
    for (entity, role) in roles_for(&members) {
        presenter.show(entity, role);
    }
}

/// Whether dropping `a`'s stack onto `b`'s would merge anything
///
/// Same kind, different stacks, and the destination has room for at least
/// one more member.
pub fn can_merge(world: &World, a: EntityId, b: EntityId, capacity: usize) -> bool {
    let (Some(ea), Some(eb)) = (world.get(a), world.get(b)) else {
        return false;
    };
    ea.definition.same_kind(&eb.definition)
        && !same_stack(world, a, b)
        && stack_len(world, b) < capacity
}

/// Merge the stack containing `a` into the stack containing `b`
///
/// `b`'s root becomes the destination root (the card dropped onto wins the
/// bottom). `dragged` ends up on top when it's part of either stack,
/// otherwise `a`'s root does. Whatever exceeds capacity is unlinked and
/// scattered beside the stack as singletons.
pub fn merge(
    world: &mut World,
    a: EntityId,
    b: EntityId,
    dragged: Option<EntityId>,
    config: &StackConfig,
    rng: &mut impl Rng,
    presenter: &mut dyn StackPresenter,
) -> Result<MergeOutcome> {
    let root_a = get_root(world, a).ok_or(TableError::EntityNotFound(a))?;
    let root_b = get_root(world, b).ok_or(TableError::EntityNotFound(b))?;
    if root_a == root_b {
        return Err(TableError::SameStack(root_a));
    }

    let (def_a, def_b) = match (world.get(root_a), world.get(root_b)) {
        (Some(ea), Some(eb)) => (ea.definition.clone(), eb.definition.clone()),
        _ => return Err(TableError::EntityNotFound(root_a)),
    };
    if !def_a.same_kind(&def_b) {
        return Err(TableError::DefinitionMismatch {
            left: def_a.key.clone(),
            right: def_b.key.clone(),
        });
    }

    let stack_a = members_including_self(world, root_a);
    let stack_b = members_including_self(world, root_b);
    let top = dragged
        .filter(|d| stack_a.contains(d) || stack_b.contains(d))
        .filter(|d| *d != root_b)
        .unwrap_or(root_a);

    let mut ordered = Vec::with_capacity(stack_a.len() + stack_b.len());
    ordered.push(root_b);
    ordered.extend(stack_b.iter().copied().filter(|id| *id != root_b && *id != top));
    ordered.extend(stack_a.iter().copied().filter(|id| *id != top));
    ordered.push(top);

    let capacity = config.max_stack_size.max(2);
    let ejected: Vec<EntityId> = if ordered.len() > capacity {
        let overflow = ordered.len() - capacity;
        let middle_end = ordered.len() - 1;
        ordered.drain(middle_end - overflow..middle_end).collect()
    } else {
        Vec::new()
    };

    for id in ordered.iter().chain(ejected.iter()) {
        if let Some(entity) = world.get_mut(*id) {
            entity.unlink();
        }
    }
    for id in &ordered[1..] {
        if let Some(entity) = world.get_mut(*id) {
            entity.root = Some(root_b);
        }
    }
    if let Some(root) = world.get_mut(root_b) {
        root.members = ordered.clone();
    }
    world.relayout_stack(root_b);

    let origin = world.get(root_b).map(|e| e.position).unwrap_or_default();
    for id in &ejected {
        let jitter = if config.eject_jitter > 0.0 {
            Vec2::new(
                rng.gen_range(-config.eject_jitter..=config.eject_jitter),
                rng.gen_range(-config.eject_jitter..=config.eject_jitter),
            )
        } else {
            Vec2::ZERO
        };
        if let Some(entity) = world.get_mut(*id) {
            entity.position = origin + Vec2::new(config.eject_distance, 0.0) + jitter;
        }
    }

    present_stack(world, root_b, presenter);
    for id in &ejected {
        present_stack(world, *id, presenter);
    }

    tracing::debug!(
        root = %root_b,
        top = %top,
        size = ordered.len(),
        ejected = ejected.len(),
        "merged stacks"
    );

    Ok(MergeOutcome {
        root: root_b,
        ejected,
    })
}

/// Pull the top member off the clicked entity's stack
///
/// Returns the extracted entity, fully unlinked. A stack left with a single
/// entity is dissolved. `None` when the clicked entity is already alone.
pub fn split(
    world: &mut World,
    clicked: EntityId,
    presenter: &mut dyn StackPresenter,
) -> Option<EntityId> {
    let root = get_root(world, clicked)?;
    let members = members_including_self(world, root);
    if members.len() < 2 {
        return None;
    }
    let top = *members.last()?;

    if let Some(entity) = world.get_mut(root) {
        entity.members.pop();
        if entity.members.len() <= 1 {
            entity.members.clear();
        }
    }
    if let Some(entity) = world.get_mut(top) {
        entity.unlink();
    }
    world.relayout_stack(root);

    present_stack(world, root, presenter);
    present_stack(world, top, presenter);

    tracing::debug!(root = %root, extracted = %top, "split stack");
    Some(top)
}
