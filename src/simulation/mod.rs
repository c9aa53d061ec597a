//! Table state, the frame-driven session and scene loading

pub mod events;
pub mod scene;
pub mod session;
pub mod snapshot;
pub mod table;

pub use events::{TableEvent, TableEventKind, TableEventLog};
pub use scene::{SceneFile, SpawnSpec};
pub use session::Session;
pub use snapshot::SessionSnapshot;
pub use table::Table;
