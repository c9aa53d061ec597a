pub mod timeline;

pub use timeline::{Completion, Motion, Timeline, TimelineId, Timelines};
