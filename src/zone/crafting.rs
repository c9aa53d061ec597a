//! Crafting zones: recipe matching and the craft countdown
//!
//! A crafting zone never crafts on its own. Each refresh recomputes which
//! recipe its contents satisfy; the player then triggers the craft, which
//! counts down (pausable) and reports completion back to the session.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::suspend::Suspendable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeInput {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub inputs: Vec<RecipeInput>,
    /// Definition key of the crafted entity
    pub output: String,
    /// Seconds the countdown runs
    #[serde(default = "default_duration")]
    pub duration: f32,
}

fn default_duration() -> f32 {
    3.0
}

impl Recipe {
    pub fn is_satisfied_by(&self, contents: &AHashMap<String, usize>) -> bool {
        !self.inputs.is_empty()
            && self
                .inputs
                .iter()
                .all(|input| contents.get(&input.key).copied().unwrap_or(0) >= input.count)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeBook {
    pub recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Index of the first recipe the contents satisfy
    pub fn first_satisfied(&self, contents: &AHashMap<String, usize>) -> Option<usize> {
        self.recipes.iter().position(|r| r.is_satisfied_by(contents))
    }

    pub fn get(&self, index: usize) -> Option<&Recipe> {
        self.recipes.get(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CraftCountdown {
    pub recipe: usize,
    pub remaining: f32,
}

/// Per-zone crafting state; rebuilt at runtime, never persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CraftingState {
    #[serde(skip)]
    available: Option<usize>,
    #[serde(skip)]
    countdown: Option<CraftCountdown>,
    #[serde(skip)]
    suspended: bool,
}

impl CraftingState {
    /// Recipe the current contents satisfy
    pub fn available(&self) -> Option<usize> {
        self.available
    }

    pub fn countdown(&self) -> Option<CraftCountdown> {
        self.countdown
    }

    pub fn is_crafting(&self) -> bool {
        self.countdown.is_some()
    }

    /// Recompute availability; true when it changed
    pub fn refresh(&mut self, book: &RecipeBook, contents: &AHashMap<String, usize>) -> bool {
        let next = book.first_satisfied(contents);
        let changed = next != self.available;
        self.available = next;
        if self.available.is_none() {
            self.countdown = None;
        }
        changed
    }

    /// Player trigger; returns the recipe started
    pub fn start(&mut self, book: &RecipeBook) -> Option<usize> {
        if self.countdown.is_some() {
            return None;
        }
        let recipe = self.available?;
        let duration = book.get(recipe)?.duration;
        self.countdown = Some(CraftCountdown {
            recipe,
            remaining: duration,
        });
        Some(recipe)
    }

    pub fn cancel(&mut self) {
        self.countdown = None;
    }

    /// Run the countdown; returns the recipe index when it finishes
    pub fn advance(&mut self, dt: f32) -> Option<usize> {
        if self.suspended {
            return None;
        }
        let countdown = self.countdown.as_mut()?;
        countdown.remaining -= dt;
        if countdown.remaining > 0.0 {
            return None;
        }
        let finished = countdown.recipe;
        self.countdown = None;
        Some(finished)
    }
}

impl Suspendable for CraftingState {
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
