use docmap_types::Document;

use crate::error::StoreResult;

/// Keyed document storage.
///
/// Documents are addressed by `(collection, key)`. The store never looks
/// inside a document; merge semantics live in the mapper.
pub trait DocumentStore: Send + Sync {
    /// Read a document. Returns `Ok(None)` if nothing is stored.
    fn read(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;

    /// Store a new document. Fails with `AlreadyExists` if the key is taken.
    fn create(&self, collection: &str, key: &str, document: Document) -> StoreResult<()>;

    /// Overwrite an existing document. Fails with `NotFound` if the key is free.
    fn replace(&self, collection: &str, key: &str, document: Document) -> StoreResult<()>;

    /// Delete a document. Returns `true` if it existed.
    fn delete(&self, collection: &str, key: &str) -> StoreResult<bool>;

    /// Keys stored in a collection, sorted.
    fn list(&self, collection: &str) -> StoreResult<Vec<String>>;

    /// Check whether a document is stored under the key.
    fn exists(&self, collection: &str, key: &str) -> StoreResult<bool> {
        Ok(self.read(collection, key)?.is_some())
    }
}
