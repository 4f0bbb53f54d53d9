use docmap_mapper::MapError;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document is stored under the key.
    #[error("document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    /// A document is already stored under the key.
    #[error("document already exists: {collection}/{key}")]
    AlreadyExists { collection: String, key: String },

    /// Building or updating a document failed.
    #[error("mapping failed: {0}")]
    Mapping(#[from] MapError),

    /// A document could not be encoded for export.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
