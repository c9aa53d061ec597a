use thiserror::Error;

use crate::core::types::{EntityId, ZoneId};

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Cannot merge {left} onto {right}: definitions differ")]
    DefinitionMismatch { left: String, right: String },

    #[error("Entities already share a stack rooted at {0}")]
    SameStack(EntityId),

    #[error("Equipment {0} is stacked and cannot be equipped")]
    EquipStacked(EntityId),

    #[error("No equipment/holder pairing between {0} and {1}")]
    NotEquippable(EntityId, EntityId),

    #[error("Entity {0} cannot be dragged")]
    NonDraggable(EntityId),

    #[error("A drag gesture is already in progress")]
    GestureInProgress,

    #[error("No drag gesture in progress")]
    NoGesture,

    #[error("Zone '{new}' overlaps zone '{existing}' of the same category")]
    ZoneOverlap { new: String, existing: String },

    #[error("Zone not found: {0:?}")]
    ZoneNotFound(ZoneId),

    #[error("Unknown definition: {0}")]
    UnknownDefinition(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;
