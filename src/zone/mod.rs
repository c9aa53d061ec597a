pub mod crafting;
pub mod region;
pub mod registry;

pub use crafting::{CraftCountdown, CraftingState, Recipe, RecipeBook, RecipeInput};
pub use region::{Zone, ZoneCategory, ZoneRules};
pub use registry::{ZoneNotice, ZoneRegistry};
