//! Error types for document mapping.

use docmap_model::{Cardinality, ModelError};
use docmap_types::{EntityTypeId, InstanceKey, TypeError};
use thiserror::Error;

/// Errors from document mapping operations.
///
/// Every variant is fatal to the create or update call that raised it. The
/// mapper performs no retries and returns no partial document; a document
/// passed to an update is not guaranteed consistent after a failure.
#[derive(Debug, Error)]
pub enum MapError {
    /// The model does not describe what the call needs.
    #[error("configuration error for {entity}: {reason}")]
    Configuration { entity: EntityTypeId, reason: String },

    /// A type lookup against the model failed.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// The entry has no value for its key field.
    #[error("{entity} entry has no value for key field {key_field:?}")]
    MissingKeyValue {
        entity: EntityTypeId,
        key_field: String,
    },

    /// A navigation's runtime value disagrees with its declared cardinality.
    #[error("navigation {entity}.{navigation} is declared {expected:?} but holds {found}")]
    ShapeMismatch {
        entity: EntityTypeId,
        navigation: String,
        expected: Cardinality,
        found: &'static str,
    },

    /// Embedded documents nest deeper than the configured limit.
    #[error("nesting below {entity} exceeds the limit of {limit}")]
    NestingTooDeep { entity: EntityTypeId, limit: usize },

    /// A related instance could not be resolved to an entry.
    #[error("cannot resolve {instance} as {declaring_type} for navigation {navigation:?}")]
    Unresolved {
        navigation: String,
        declaring_type: EntityTypeId,
        instance: InstanceKey,
    },

    /// An instance key is not known to the change tracker.
    #[error("unknown instance {0}")]
    UnknownInstance(InstanceKey),

    /// A value cannot be converted to or from the document representation.
    #[error("cannot convert {entity}.{field}: {source}")]
    TypeConversion {
        entity: EntityTypeId,
        field: String,
        #[source]
        source: TypeError,
    },
}

impl MapError {
    /// Misconfiguration: the model or the entry's shape is inconsistent.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MapError::Configuration { .. }
                | MapError::Model(_)
                | MapError::MissingKeyValue { .. }
                | MapError::ShapeMismatch { .. }
                | MapError::NestingTooDeep { .. }
        )
    }

    /// A nested owned instance could not be resolved.
    pub fn is_resolution(&self) -> bool {
        matches!(self, MapError::Unresolved { .. } | MapError::UnknownInstance(_))
    }

    /// A scalar value has no document representation.
    pub fn is_type_conversion(&self) -> bool {
        matches!(self, MapError::TypeConversion { .. })
    }
}

/// Result alias for mapping operations.
pub type MapResult<T> = Result<T, MapError>;
