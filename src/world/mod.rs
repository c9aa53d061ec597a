pub mod registry;

pub use registry::World;
