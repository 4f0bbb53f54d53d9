use docmap_mapper::{
    ChangeTracker, DocumentMapper, EntitySnapshot, EntityState, Entry, MapperRegistry,
    TrackedEntry,
};
use docmap_types::{EntityTypeId, InstanceKey};
use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::traits::DocumentStore;

/// Counts of store operations performed by one save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub created: usize,
    pub replaced: usize,
    pub deleted: usize,
    /// Root entries that needed no write.
    pub unchanged: usize,
}

impl SaveSummary {
    /// Total number of documents written or removed.
    pub fn writes(&self) -> usize {
        self.created + self.replaced + self.deleted
    }
}

/// Writes the pending changes of a [`ChangeTracker`] to a [`DocumentStore`].
///
/// Only document roots are written. Dependents travel inside their root's
/// document, and changing one marks the root as modified.
pub struct DocumentWriter<'a, S: DocumentStore + ?Sized> {
    registry: &'a MapperRegistry,
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> DocumentWriter<'a, S> {
    pub fn new(registry: &'a MapperRegistry, store: &'a S) -> Self {
        Self { registry, store }
    }

    /// Save every tracked instance.
    ///
    /// The tracker is left as is; call
    /// [`ChangeTracker::accept_changes`] once the save succeeds.
    pub fn save(&self, tracker: &ChangeTracker) -> StoreResult<SaveSummary> {
        self.save_keys(tracker, &tracker.keys())
    }

    /// Save the given tracked instances, in order.
    ///
    /// Stops at the first failure; writes already performed stay in the store.
    pub fn save_keys(
        &self,
        tracker: &ChangeTracker,
        keys: &[InstanceKey],
    ) -> StoreResult<SaveSummary> {
        let mut summary = SaveSummary::default();
        for &key in keys {
            let Some(entry) = tracker.entry(key) else {
                continue;
            };
            let mapper = self.registry.mapper_for(entry.entity_type())?;
            let Some(collection) = mapper.collection_id() else {
                continue;
            };
            self.save_entry(&mapper, collection, &entry, &mut summary)?;
        }
        debug!(
            created = summary.created,
            replaced = summary.replaced,
            deleted = summary.deleted,
            "changes saved"
        );
        Ok(summary)
    }

    /// Read a stored document back as entity values.
    pub fn load(&self, entity_type: &EntityTypeId, key: &str) -> StoreResult<Option<EntitySnapshot>> {
        let mapper = self.registry.mapper_for(entity_type)?;
        let Some(collection) = mapper.collection_id() else {
            return Ok(None);
        };
        match self.store.read(collection, key)? {
            Some(document) => Ok(Some(mapper.materialize(&document)?)),
            None => Ok(None),
        }
    }

    fn save_entry(
        &self,
        mapper: &DocumentMapper<'_>,
        collection: &str,
        entry: &TrackedEntry<'_>,
        summary: &mut SaveSummary,
    ) -> StoreResult<()> {
        match entry.state() {
            EntityState::Unchanged => summary.unchanged += 1,
            EntityState::Added => {
                let key = mapper.document_key(entry)?;
                let document = mapper.create_document(entry)?;
                self.store.create(collection, &key, document)?;
                summary.created += 1;
            }
            EntityState::Modified => {
                let key = mapper.document_key(entry)?;
                match self.store.read(collection, &key)? {
                    Some(existing) => {
                        let document = mapper.update_document(existing, entry)?;
                        self.store.replace(collection, &key, document)?;
                        summary.replaced += 1;
                    }
                    None => {
                        warn!(
                            collection,
                            key = %key,
                            "stored document missing for modified entity, creating it"
                        );
                        let document = mapper.create_document(entry)?;
                        self.store.create(collection, &key, document)?;
                        summary.created += 1;
                    }
                }
            }
            EntityState::Deleted => {
                let key = mapper.document_key(entry)?;
                if self.store.delete(collection, &key)? {
                    summary.deleted += 1;
                }
            }
        }
        Ok(())
    }
}
