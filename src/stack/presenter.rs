//! Stack presentation collaborator
//!
//! The stack model never draws anything. After each structural change it
//! tells the presenter which role every member now plays.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::core::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackRole {
    /// Free-standing entity
    Single,
    /// Bottom of a stack, carrying the count badge
    Bottom { count: usize },
    /// Hidden between bottom and top
    Middle,
    /// Visible top card, carrying the count badge
    Top { count: usize },
}

pub trait StackPresenter {
    fn show(&mut self, entity: EntityId, role: StackRole);
}

/// Presenter that ignores every call (headless runs)
#[derive(Debug, Default)]
pub struct NullPresenter;

impl StackPresenter for NullPresenter {
    fn show(&mut self, _entity: EntityId, _role: StackRole) {}
}

/// Keeps the latest role per entity
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    roles: AHashMap<EntityId, StackRole>,
    pub calls: usize,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self, entity: EntityId) -> Option<StackRole> {
        self.roles.get(&entity).copied()
    }

    /// Count label shown on this entity, if any
    pub fn count_label(&self, entity: EntityId) -> Option<String> {
        match self.roles.get(&entity)? {
            StackRole::Bottom { count } | StackRole::Top { count } => Some(count.to_string()),
            StackRole::Single | StackRole::Middle => None,
        }
    }
}

impl StackPresenter for RecordingPresenter {
    fn show(&mut self, entity: EntityId, role: StackRole) {
        self.calls += 1;
        self.roles.insert(entity, role);
    }
}

/// Shared handle so a caller can keep inspecting what the table showed
impl<P: StackPresenter> StackPresenter for Rc<RefCell<P>> {
    fn show(&mut self, entity: EntityId, role: StackRole) {
        self.borrow_mut().show(entity, role);
    }
}

/// Roles for an ordered member list, bottom to top
pub fn roles_for(members: &[EntityId]) -> impl Iterator<Item = (EntityId, StackRole)> + '_ {
    let count = members.len();
    members.iter().enumerate().map(move |(index, id)| {
        let role = match (count, index) {
            (0 | 1, _) => StackRole::Single,
            (_, 0) => StackRole::Bottom { count },
            (_, i) if i + 1 == count => StackRole::Top { count },
            _ => StackRole::Middle,
        };
        (*id, role)
    })
}
