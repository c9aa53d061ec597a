//! Scene files: definitions, recipes, zones and starting pieces in TOML
//!
//! ```toml
//! [config]
//! seed = 7
//! play_area = { min = { x = 0.0, y = 0.0 }, max = { x = 40.0, y = 30.0 } }
//!
//! [[definitions]]
//! key = "wood"
//!
//! [[zones]]
//! name = "bench"
//! area = { min = { x = 2.0, y = 2.0 }, max = { x = 8.0, y = 8.0 } }
//! rules = { kind = "crafting" }
//!
//! [[spawns]]
//! key = "wood"
//! position = { x = 4.0, y = 4.0 }
//! count = 3
//! stacked = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, Vec2};
use crate::entity::EntityDefinition;
use crate::simulation::session::Session;
use crate::stack::merge;
use crate::zone::{Recipe, RecipeBook, Zone};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnSpec {
    pub key: String,
    pub position: Vec2,
    #[serde(default = "default_count")]
    pub count: usize,
    /// Spawn `count` pieces as one stack instead of side by side
    #[serde(default)]
    pub stacked: bool,
}

fn default_count() -> usize {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub config: SimulationConfig,
    pub definitions: Vec<EntityDefinition>,
    pub recipes: Vec<Recipe>,
    pub zones: Vec<Zone>,
    pub spawns: Vec<SpawnSpec>,
}

impl SceneFile {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scene: Self = toml::from_str(content)?;
        scene.config.validate()?;
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build a running session from the scene
    pub fn into_session(self) -> Result<Session> {
        let mut session = Session::new(self.config.clone());
        self.populate(&mut session)?;
        Ok(session)
    }

    /// Register everything the scene declares into an existing session
    pub fn populate(self, session: &mut Session) -> Result<()> {
        for definition in self.definitions {
            session.table.catalog.insert(definition);
        }
        session.table.zones.set_recipes(RecipeBook::new(self.recipes));
        for zone in self.zones {
            session.table.zones.register(zone)?;
        }

        for spawn in &self.spawns {
            let mut placed: Vec<EntityId> = Vec::with_capacity(spawn.count);
            for i in 0..spawn.count {
                let position = if spawn.stacked {
                    spawn.position
                } else {
                    spawn.position + Vec2::new(i as f32 * 1.5, 0.0)
                };
                placed.push(session.spawn_key(&spawn.key, position)?);
            }
            if spawn.stacked {
                stack_up(session, &placed)?;
            }
        }

        tracing::info!(
            entities = session.table.world.len(),
            zones = session.table.zones.len(),
            "scene loaded"
        );
        Ok(())
    }
}

fn stack_up(session: &mut Session, placed: &[EntityId]) -> Result<()> {
    let Some((&bottom, rest)) = placed.split_first() else {
        return Ok(());
    };
    let config = session.table.config.stack.clone();
    let table = &mut session.table;
    for &id in rest {
        merge(
            &mut table.world,
            id,
            bottom,
            Some(id),
            &config,
            &mut table.rng,
            table.presenter.as_mut(),
        )?;
    }
    table.settle(bottom);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::stack_len;
    use crate::zone::ZoneCategory;

    const SCENE: &str = r#"
[config]
seed = 7
play_area = { min = { x = 0.0, y = 0.0 }, max = { x = 40.0, y = 30.0 } }

[config.stack]
max_stack_size = 5

[[definitions]]
key = "wood"

[[definitions]]
key = "goblin"
tags = ["hostile"]

[[recipes]]
name = "fire"
output = "wood"
inputs = [{ key = "wood", count = 2 }]

[[zones]]
name = "bench"
area = { min = { x = 2.0, y = 2.0 }, max = { x = 8.0, y = 8.0 } }
rules = { kind = "crafting" }

[[zones]]
name = "lane"
area = { min = { x = 20.0, y = 2.0 }, max = { x = 30.0, y = 6.0 } }
rules = { kind = "exploration_lane", capacity = 3 }

[[spawns]]
key = "wood"
position = { x = 4.0, y = 4.0 }
count = 3
stacked = true

[[spawns]]
key = "goblin"
position = { x = 15.0, y = 15.0 }
"#;

    #[test]
    fn test_scene_builds_session() {
        let scene = SceneFile::from_toml_str(SCENE).unwrap();
        assert_eq!(scene.config.stack.max_stack_size, 5);
        let session = scene.into_session().unwrap();

        assert_eq!(session.table.world.len(), 4);
        assert_eq!(session.table.zones.len(), 2);
        assert_eq!(session.agents.len(), 1);

        let root = session
            .table
            .world
            .roots()
            .find(|e| e.definition.key == "wood")
            .unwrap();
        assert_eq!(stack_len(&session.table.world, root.id), 3);
        let bench = session.table.zones.iter().next().unwrap();
        assert_eq!(bench.category(), ZoneCategory::Crafting);
        assert_eq!(root.current_zone, Some(bench.id));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = "[config.stack]\nmax_stack_size = 1\n";
        assert!(SceneFile::from_toml_str(bad).is_err());
    }

    #[test]
    fn test_overlapping_zones_rejected() {
        let scene = r#"
[[zones]]
name = "a"
area = { min = { x = 0.0, y = 0.0 }, max = { x = 5.0, y = 5.0 } }
rules = { kind = "generic" }

[[zones]]
name = "b"
area = { min = { x = 4.0, y = 4.0 }, max = { x = 9.0, y = 9.0 } }
rules = { kind = "generic" }
"#;
        let scene = SceneFile::from_toml_str(scene).unwrap();
        assert!(scene.into_session().is_err());
    }
}
