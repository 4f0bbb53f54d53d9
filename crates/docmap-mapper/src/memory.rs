use std::collections::{HashMap, HashSet};

use docmap_types::{EntityTypeId, FieldValue, InstanceKey};
use indexmap::IndexMap;

use crate::entry::{Entry, NavigationValue};
use crate::error::{MapError, MapResult};

/// Lifecycle state of a tracked instance relative to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// New; its document has not been stored yet.
    Added,
    /// Stored and unchanged since.
    Unchanged,
    /// Stored, with changes to itself or to an owned dependent.
    Modified,
    /// Stored, and scheduled for removal.
    Deleted,
}

/// One tracked instance.
#[derive(Clone, Debug)]
pub struct TrackedEntity {
    entity_type: EntityTypeId,
    state: EntityState,
    values: IndexMap<String, FieldValue>,
    modified: HashSet<String>,
    navigations: HashMap<String, NavigationValue>,
    owner: Option<InstanceKey>,
}

impl TrackedEntity {
    fn new(entity_type: EntityTypeId, state: EntityState, values: IndexMap<String, FieldValue>) -> Self {
        Self {
            entity_type,
            state,
            values,
            modified: HashSet::new(),
            navigations: HashMap::new(),
            owner: None,
        }
    }

    pub fn entity_type(&self) -> &EntityTypeId {
        &self.entity_type
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    /// The instance that owns this one, if it is attached to an owner.
    pub fn owner(&self) -> Option<InstanceKey> {
        self.owner
    }

    fn detach(&mut self, dependent: InstanceKey) {
        self.navigations.retain(|_, value| match value {
            NavigationValue::One(key) => *key != dependent,
            NavigationValue::Many(keys) => {
                keys.retain(|key| *key != dependent);
                true
            }
            NavigationValue::Absent => true,
        });
    }

    fn touch(&mut self) {
        if self.state == EntityState::Unchanged {
            self.state = EntityState::Modified;
        }
    }
}

/// In-memory change tracker for tests and embedding.
///
/// Holds every tracked instance by [`InstanceKey`] and hands out
/// [`TrackedEntry`] handles implementing [`Entry`]. Writes through the
/// tracker flag the field as modified and mark the instance, and every
/// owner above it, as [`EntityState::Modified`].
#[derive(Clone, Debug, Default)]
pub struct ChangeTracker {
    entities: HashMap<InstanceKey, TrackedEntity>,
    next_key: u64,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new instance in the [`EntityState::Added`] state.
    pub fn add<K, V>(
        &mut self,
        entity_type: impl Into<EntityTypeId>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> InstanceKey
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.track(entity_type.into(), EntityState::Added, values)
    }

    /// Track an instance that is already stored, in the
    /// [`EntityState::Unchanged`] state.
    pub fn attach<K, V>(
        &mut self,
        entity_type: impl Into<EntityTypeId>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> InstanceKey
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.track(entity_type.into(), EntityState::Unchanged, values)
    }

    fn track<K, V>(
        &mut self,
        entity_type: EntityTypeId,
        state: EntityState,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> InstanceKey
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.next_key += 1;
        let key = InstanceKey::new(self.next_key);
        let values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.entities
            .insert(key, TrackedEntity::new(entity_type, state, values));
        key
    }

    /// Set a scalar value and flag the field as modified.
    pub fn set_value(
        &mut self,
        key: InstanceKey,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> MapResult<()> {
        let field = field.into();
        let entity = self.get_mut(key)?;
        entity.values.insert(field.clone(), value.into());
        entity.modified.insert(field);
        self.touch_with_owners(key);
        Ok(())
    }

    /// Point a single-valued navigation at `dependent`, or clear it with `None`.
    pub fn set_one(
        &mut self,
        key: InstanceKey,
        navigation: impl Into<String>,
        dependent: Option<InstanceKey>,
    ) -> MapResult<()> {
        if let Some(dependent) = dependent {
            self.get_mut(dependent)?.owner = Some(key);
        }
        self.get_mut(key)?
            .navigations
            .insert(navigation.into(), NavigationValue::from(dependent));
        self.touch_with_owners(key);
        Ok(())
    }

    /// Replace a collection navigation with `dependents`, in order.
    pub fn set_many(
        &mut self,
        key: InstanceKey,
        navigation: impl Into<String>,
        dependents: Vec<InstanceKey>,
    ) -> MapResult<()> {
        for dependent in &dependents {
            self.get_mut(*dependent)?.owner = Some(key);
        }
        self.get_mut(key)?
            .navigations
            .insert(navigation.into(), NavigationValue::Many(dependents));
        self.touch_with_owners(key);
        Ok(())
    }

    /// Clear a navigation so it reads as [`NavigationValue::Absent`].
    pub fn clear_navigation(&mut self, key: InstanceKey, navigation: &str) -> MapResult<()> {
        self.get_mut(key)?.navigations.remove(navigation);
        self.touch_with_owners(key);
        Ok(())
    }

    /// Schedule an instance for removal. Added instances are simply forgotten.
    ///
    /// A deleted dependent is detached from its owner's navigation, and the
    /// owner chain is marked modified so the owning document is rewritten.
    pub fn delete(&mut self, key: InstanceKey) -> MapResult<()> {
        let entity = self.get_mut(key)?;
        let owner = entity.owner.take();
        if entity.state == EntityState::Added {
            self.entities.remove(&key);
        } else {
            entity.state = EntityState::Deleted;
        }

        if let Some(owner) = owner {
            if let Some(owner_entity) = self.entities.get_mut(&owner) {
                owner_entity.detach(key);
            }
            self.touch_with_owners(owner);
        }
        Ok(())
    }

    /// Mark everything as saved: forget deleted instances, move added and
    /// modified ones to unchanged, and clear modified flags.
    pub fn accept_changes(&mut self) {
        self.entities
            .retain(|_, entity| entity.state != EntityState::Deleted);
        for entity in self.entities.values_mut() {
            entity.state = EntityState::Unchanged;
            entity.modified.clear();
        }
    }

    pub fn get(&self, key: InstanceKey) -> Option<&TrackedEntity> {
        self.entities.get(&key)
    }

    pub fn state(&self, key: InstanceKey) -> Option<EntityState> {
        self.entities.get(&key).map(TrackedEntity::state)
    }

    /// An [`Entry`] handle for the instance.
    pub fn entry(&self, key: InstanceKey) -> Option<TrackedEntry<'_>> {
        self.entities.get(&key).map(|entity| TrackedEntry {
            tracker: self,
            key,
            entity,
        })
    }

    /// Keys of all tracked instances, sorted.
    pub fn keys(&self) -> Vec<InstanceKey> {
        let mut keys: Vec<InstanceKey> = self.entities.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn get_mut(&mut self, key: InstanceKey) -> MapResult<&mut TrackedEntity> {
        self.entities
            .get_mut(&key)
            .ok_or(MapError::UnknownInstance(key))
    }

    fn touch_with_owners(&mut self, key: InstanceKey) {
        let mut seen = HashSet::new();
        let mut current = Some(key);
        while let Some(k) = current {
            if !seen.insert(k) {
                break;
            }
            current = match self.entities.get_mut(&k) {
                Some(entity) => {
                    entity.touch();
                    entity.owner
                }
                None => None,
            };
        }
    }
}

/// [`Entry`] handle borrowed from a [`ChangeTracker`].
#[derive(Clone, Copy, Debug)]
pub struct TrackedEntry<'a> {
    tracker: &'a ChangeTracker,
    key: InstanceKey,
    entity: &'a TrackedEntity,
}

impl<'a> TrackedEntry<'a> {
    pub fn key(&self) -> InstanceKey {
        self.key
    }

    pub fn state(&self) -> EntityState {
        self.entity.state
    }
}

impl Entry for TrackedEntry<'_> {
    fn entity_type(&self) -> &EntityTypeId {
        &self.entity.entity_type
    }

    fn current_value(&self, field: &str) -> FieldValue {
        self.entity
            .values
            .get(field)
            .cloned()
            .unwrap_or(FieldValue::Null)
    }

    fn is_modified(&self, field: &str) -> bool {
        self.entity.state == EntityState::Added || self.entity.modified.contains(field)
    }

    fn navigation(&self, name: &str) -> NavigationValue {
        self.entity
            .navigations
            .get(name)
            .cloned()
            .unwrap_or(NavigationValue::Absent)
    }

    fn resolve_entry(
        &self,
        instance: InstanceKey,
        declaring_type: &EntityTypeId,
    ) -> Option<Box<dyn Entry + '_>> {
        let entry = self.tracker.entry(instance)?;
        if entry.entity_type() != declaring_type {
            return None;
        }
        Some(Box::new(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with_address(tracker: &mut ChangeTracker) -> (InstanceKey, InstanceKey) {
        let order = tracker.attach("Shop.Order", [("id", FieldValue::from("1")), ("total", FieldValue::from(9.5))]);
        let address = tracker.attach("Shop.Address", [("street", "Main"), ("city", "NYC")]);
        tracker.set_one(order, "address", Some(address)).unwrap();
        tracker.accept_changes();
        (order, address)
    }

    #[test]
    fn added_instances_start_added() {
        let mut tracker = ChangeTracker::new();
        let key = tracker.add("Shop.Order", [("id", "1")]);
        assert_eq!(tracker.state(key), Some(EntityState::Added));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn set_value_flags_field_and_state() {
        let mut tracker = ChangeTracker::new();
        let (order, _) = order_with_address(&mut tracker);

        tracker.set_value(order, "total", 12.0).unwrap();
        let entry = tracker.entry(order).unwrap();
        assert!(entry.is_modified("total"));
        assert!(!entry.is_modified("id"));
        assert_eq!(entry.current_value("total"), FieldValue::F64(12.0));
        assert_eq!(entry.state(), EntityState::Modified);
    }

    #[test]
    fn dependent_changes_mark_owner_modified() {
        let mut tracker = ChangeTracker::new();
        let (order, address) = order_with_address(&mut tracker);

        tracker.set_value(address, "city", "Boston").unwrap();
        assert_eq!(tracker.state(order), Some(EntityState::Modified));
        assert!(!tracker.entry(order).unwrap().is_modified("city"));
    }

    #[test]
    fn unset_values_read_as_null() {
        let mut tracker = ChangeTracker::new();
        let key = tracker.add("Shop.Order", [("id", "1")]);
        let entry = tracker.entry(key).unwrap();
        assert_eq!(entry.current_value("total"), FieldValue::Null);
        assert_eq!(entry.navigation("address"), NavigationValue::Absent);
    }

    #[test]
    fn resolve_checks_declaring_type() {
        let mut tracker = ChangeTracker::new();
        let (order, address) = order_with_address(&mut tracker);
        let entry = tracker.entry(order).unwrap();

        let resolved = entry
            .resolve_entry(address, &"Shop.Address".into())
            .unwrap();
        assert_eq!(resolved.current_value("city"), FieldValue::from("NYC"));
        assert!(entry.resolve_entry(address, &"Shop.Line".into()).is_none());
        assert!(entry
            .resolve_entry(InstanceKey::new(999), &"Shop.Address".into())
            .is_none());
    }

    #[test]
    fn unknown_keys_are_errors() {
        let mut tracker = ChangeTracker::new();
        let err = tracker
            .set_value(InstanceKey::new(5), "total", 1i64)
            .unwrap_err();
        assert!(err.is_resolution());

        let order = tracker.add("Shop.Order", [("id", "1")]);
        let err = tracker
            .set_one(order, "address", Some(InstanceKey::new(77)))
            .unwrap_err();
        assert!(matches!(err, MapError::UnknownInstance(k) if k == InstanceKey::new(77)));
    }

    #[test]
    fn accept_changes_clears_flags_and_drops_deleted() {
        let mut tracker = ChangeTracker::new();
        let (order, address) = order_with_address(&mut tracker);
        tracker.set_value(order, "total", 1.0).unwrap();
        tracker.delete(address).unwrap();
        assert_eq!(tracker.state(address), Some(EntityState::Deleted));

        tracker.accept_changes();
        assert_eq!(tracker.state(order), Some(EntityState::Unchanged));
        assert!(!tracker.entry(order).unwrap().is_modified("total"));
        assert!(tracker.get(address).is_none());
    }

    #[test]
    fn added_instances_report_every_field_modified() {
        let mut tracker = ChangeTracker::new();
        let key = tracker.add("Shop.Address", [("city", "NYC")]);
        let entry = tracker.entry(key).unwrap();
        assert!(entry.is_modified("city"));
        assert!(entry.is_modified("street"));

        tracker.accept_changes();
        assert!(!tracker.entry(key).unwrap().is_modified("city"));
    }

    #[test]
    fn deleting_dependent_detaches_it_from_owner() {
        let mut tracker = ChangeTracker::new();
        let (order, address) = order_with_address(&mut tracker);

        tracker.delete(address).unwrap();
        assert_eq!(tracker.state(order), Some(EntityState::Modified));
        assert_eq!(
            tracker.entry(order).unwrap().navigation("address"),
            NavigationValue::Absent
        );

        tracker.accept_changes();
        assert!(tracker.get(address).is_none());
        assert_eq!(tracker.state(order), Some(EntityState::Unchanged));
    }

    #[test]
    fn deleting_collection_element_keeps_the_rest() {
        let mut tracker = ChangeTracker::new();
        let order = tracker.attach("Shop.Order", [("id", "1")]);
        let lines: Vec<InstanceKey> = ["a", "b", "c"]
            .into_iter()
            .map(|sku| tracker.attach("Shop.Line", [("sku", sku)]))
            .collect();
        tracker.set_many(order, "lines", lines.clone()).unwrap();
        tracker.accept_changes();

        tracker.delete(lines[1]).unwrap();
        assert_eq!(tracker.state(order), Some(EntityState::Modified));
        assert_eq!(
            tracker.entry(order).unwrap().navigation("lines"),
            NavigationValue::Many(vec![lines[0], lines[2]])
        );
    }

    #[test]
    fn clear_navigation_reads_absent_and_marks_owner() {
        let mut tracker = ChangeTracker::new();
        let (order, _) = order_with_address(&mut tracker);

        tracker.clear_navigation(order, "address").unwrap();
        let entry = tracker.entry(order).unwrap();
        assert_eq!(entry.navigation("address"), NavigationValue::Absent);
        assert_eq!(entry.state(), EntityState::Modified);

        let err = tracker
            .clear_navigation(InstanceKey::new(42), "address")
            .unwrap_err();
        assert!(err.is_resolution());
    }

    #[test]
    fn deleting_added_instance_forgets_it() {
        let mut tracker = ChangeTracker::new();
        let key = tracker.add("Shop.Order", [("id", "1")]);
        tracker.delete(key).unwrap();
        assert!(tracker.is_empty());
    }
}
