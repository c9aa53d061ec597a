//! Stacks: ordered groups of same-kind entities under one root

pub mod model;
pub mod presenter;

pub use model::{
    can_merge, get_root, members_including_self, merge, move_stack_to, present_stack, same_stack,
    split, stack_len, stack_world_bounds, translate_stack, MergeOutcome,
};
pub use presenter::{NullPresenter, RecordingPresenter, StackPresenter, StackRole};
