use docmap_types::{EntityTypeId, FieldValue};
use indexmap::IndexMap;

/// Entity values read back out of a stored document.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    pub entity_type: EntityTypeId,
    /// Scalar values by field name. Fields missing from the document read
    /// as [`FieldValue::Null`].
    pub values: IndexMap<String, FieldValue>,
    /// Embedded dependents by navigation name.
    pub navigations: IndexMap<String, NavigationSnapshot>,
}

impl EntitySnapshot {
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn navigation(&self, name: &str) -> Option<&NavigationSnapshot> {
        self.navigations.get(name)
    }
}

/// Embedded dependents of one navigation.
#[derive(Clone, Debug, PartialEq)]
pub enum NavigationSnapshot {
    Absent,
    One(Box<EntitySnapshot>),
    Many(Vec<EntitySnapshot>),
}

impl NavigationSnapshot {
    pub fn as_one(&self) -> Option<&EntitySnapshot> {
        match self {
            NavigationSnapshot::One(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[EntitySnapshot]> {
        match self {
            NavigationSnapshot::Many(items) => Some(items),
            _ => None,
        }
    }
}
