//! Lookup table of definitions by key

use std::sync::Arc;

use ahash::AHashMap;

use crate::core::error::{Result, TableError};
use crate::entity::definition::EntityDefinition;

#[derive(Debug, Clone, Default)]
pub struct DefinitionCatalog {
    by_key: AHashMap<String, Arc<EntityDefinition>>,
}

impl DefinitionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = EntityDefinition>) -> Self {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition);
        }
        catalog
    }

    /// Add or replace a definition, returning the shared handle
    pub fn insert(&mut self, definition: EntityDefinition) -> Arc<EntityDefinition> {
        let shared = Arc::new(definition);
        self.by_key.insert(shared.key.clone(), Arc::clone(&shared));
        shared
    }

    pub fn get(&self, key: &str) -> Result<Arc<EntityDefinition>> {
        self.by_key
            .get(key)
            .cloned()
            .ok_or_else(|| TableError::UnknownDefinition(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
