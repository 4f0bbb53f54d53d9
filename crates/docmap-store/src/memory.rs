use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use docmap_types::Document;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

type DocumentMap = HashMap<(String, String), Document>;

/// In-memory, HashMap-based document store.
///
/// Intended for tests and embedding. Documents are held behind a `RwLock`
/// and cloned on read and write.
pub struct InMemoryDocumentStore {
    documents: RwLock<DocumentMap>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents across all collections.
    pub fn len(&self) -> usize {
        self.read_map().map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of collections holding at least one document, sorted.
    pub fn collections(&self) -> StoreResult<Vec<String>> {
        let map = self.read_map()?;
        let mut names: Vec<String> = map.keys().map(|(c, _)| c.clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Remove every document.
    pub fn clear(&self) -> StoreResult<()> {
        self.write_map()?.clear();
        Ok(())
    }

    /// Export a collection as a JSON object of key to document.
    pub fn export_json(&self, collection: &str) -> StoreResult<serde_json::Value> {
        let map = self.read_map()?;
        let mut keys: Vec<&String> = map
            .keys()
            .filter(|(c, _)| c == collection)
            .map(|(_, k)| k)
            .collect();
        keys.sort();

        let mut out = serde_json::Map::with_capacity(keys.len());
        for key in keys {
            let document = &map[&(collection.to_string(), key.clone())];
            let json = document
                .to_json()
                .map_err(|e| StoreError::Serialization(format!("{collection}/{key}: {e}")))?;
            out.insert(key.clone(), json);
        }
        Ok(serde_json::Value::Object(out))
    }

    fn read_map(&self) -> StoreResult<RwLockReadGuard<'_, DocumentMap>> {
        self.documents.read().map_err(|_| StoreError::Poisoned)
    }

    fn write_map(&self) -> StoreResult<RwLockWriteGuard<'_, DocumentMap>> {
        self.documents.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn slot(collection: &str, key: &str) -> (String, String) {
    (collection.to_string(), key.to_string())
}

impl DocumentStore for InMemoryDocumentStore {
    fn read(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let map = self.read_map()?;
        Ok(map.get(&slot(collection, key)).cloned())
    }

    fn create(&self, collection: &str, key: &str, document: Document) -> StoreResult<()> {
        let mut map = self.write_map()?;
        let slot = slot(collection, key);
        if map.contains_key(&slot) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        }
        debug!(collection, key, fields = document.len(), "document stored");
        map.insert(slot, document);
        Ok(())
    }

    fn replace(&self, collection: &str, key: &str, document: Document) -> StoreResult<()> {
        let mut map = self.write_map()?;
        match map.get_mut(&slot(collection, key)) {
            Some(existing) => {
                debug!(collection, key, fields = document.len(), "document replaced");
                *existing = document;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            }),
        }
    }

    fn delete(&self, collection: &str, key: &str) -> StoreResult<bool> {
        let mut map = self.write_map()?;
        let removed = map.remove(&slot(collection, key)).is_some();
        if removed {
            debug!(collection, key, "document deleted");
        }
        Ok(removed)
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<String>> {
        let map = self.read_map()?;
        let mut keys: Vec<String> = map
            .keys()
            .filter(|(c, _)| c == collection)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(total: f64) -> Document {
        Document::from_iter([("total", total)])
    }

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[test]
    fn create_and_read() {
        let store = InMemoryDocumentStore::new();
        store.create("Order", "1", doc(9.5)).unwrap();
        assert_eq!(store.read("Order", "1").unwrap(), Some(doc(9.5)));
    }

    #[test]
    fn read_missing_returns_none() {
        let store = InMemoryDocumentStore::new();
        assert!(store.read("Order", "1").unwrap().is_none());
        assert!(!store.exists("Order", "1").unwrap());
    }

    #[test]
    fn create_twice_fails() {
        let store = InMemoryDocumentStore::new();
        store.create("Order", "1", doc(1.0)).unwrap();
        let err = store.create("Order", "1", doc(2.0)).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        assert_eq!(store.read("Order", "1").unwrap(), Some(doc(1.0)));
    }

    #[test]
    fn replace_overwrites() {
        let store = InMemoryDocumentStore::new();
        store.create("Order", "1", doc(1.0)).unwrap();
        store.replace("Order", "1", doc(2.0)).unwrap();
        assert_eq!(store.read("Order", "1").unwrap(), Some(doc(2.0)));
    }

    #[test]
    fn replace_missing_fails() {
        let store = InMemoryDocumentStore::new();
        let err = store.replace("Order", "1", doc(1.0)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn delete_reports_presence() {
        let store = InMemoryDocumentStore::new();
        store.create("Order", "1", doc(1.0)).unwrap();
        assert!(store.delete("Order", "1").unwrap());
        assert!(!store.delete("Order", "1").unwrap());
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    #[test]
    fn collections_are_separate_key_spaces() {
        let store = InMemoryDocumentStore::new();
        store.create("Order", "1", doc(1.0)).unwrap();
        store.create("Invoice", "1", doc(2.0)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.read("Invoice", "1").unwrap(), Some(doc(2.0)));
        assert_eq!(store.collections().unwrap(), vec!["Invoice", "Order"]);
    }

    #[test]
    fn list_is_sorted_per_collection() {
        let store = InMemoryDocumentStore::new();
        for key in ["b", "c", "a"] {
            store.create("Order", key, doc(0.0)).unwrap();
        }
        store.create("Invoice", "z", doc(0.0)).unwrap();
        assert_eq!(store.list("Order").unwrap(), vec!["a", "b", "c"]);
        assert!(store.list("Cart").unwrap().is_empty());
    }

    #[test]
    fn export_json_keys_documents() {
        let store = InMemoryDocumentStore::new();
        store.create("Order", "2", doc(2.0)).unwrap();
        store.create("Order", "1", doc(1.0)).unwrap();
        assert_eq!(
            store.export_json("Order").unwrap(),
            json!({"1": {"total": 1.0}, "2": {"total": 2.0}})
        );
    }

    #[test]
    fn export_json_rejects_non_finite_numbers() {
        let store = InMemoryDocumentStore::new();
        store.create("Order", "1", doc(f64::NAN)).unwrap();
        let err = store.export_json("Order").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn clear_removes_all() {
        let store = InMemoryDocumentStore::new();
        store.create("Order", "1", doc(1.0)).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_writers_use_distinct_keys() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryDocumentStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.create("Order", &i.to_string(), doc(i as f64)).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(store.list("Order").unwrap().len(), 8);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryDocumentStore::new();
        store.create("Order", "1", doc(1.0)).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryDocumentStore"));
        assert!(debug.contains("document_count"));
    }
}
