//! Error types for model building.

use docmap_types::EntityTypeId;
use thiserror::Error;

/// Errors that can occur while declaring or loading an entity model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A relationship or lookup names a type that was never declared.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(EntityTypeId),

    /// The same type was declared twice.
    #[error("entity type declared twice: {0}")]
    DuplicateEntityType(EntityTypeId),

    /// Two members of one type share a name.
    #[error("duplicate member {name:?} on {entity}")]
    DuplicateName { entity: EntityTypeId, name: String },

    /// A document root does not declare the key field.
    #[error("document root {entity} has no {key_field:?} field")]
    MissingKeyField {
        entity: EntityTypeId,
        key_field: String,
    },

    /// Embedded ownership relationships form a cycle.
    #[error("ownership cycle: {path}")]
    OwnershipCycle { path: String },

    /// The configuration could not be parsed or is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
