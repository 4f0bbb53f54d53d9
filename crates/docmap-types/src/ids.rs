use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable name of an entity type.
///
/// Names are usually namespace-qualified (`"Shop.Order"`); the segment after
/// the last `.` is the type's short name, which is used as the default
/// collection name for document roots.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityTypeId(String);

impl EntityTypeId {
    /// Create an identifier from a type name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The full type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The segment after the last `.`, or the whole name when unqualified.
    pub fn short_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }
}

impl fmt::Debug for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityTypeId({})", self.0)
    }
}

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityTypeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EntityTypeId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for EntityTypeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque handle to one tracked entity instance.
///
/// Navigation values refer to related instances by key; an entry resolves a
/// key back into the related instance's entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceKey(u64);

impl InstanceKey {
    /// Create a key from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw key value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceKey({})", self.0)
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_namespace() {
        assert_eq!(EntityTypeId::new("Shop.Sales.Order").short_name(), "Order");
    }

    #[test]
    fn short_name_of_unqualified_name() {
        assert_eq!(EntityTypeId::new("Order").short_name(), "Order");
    }

    #[test]
    fn display_is_full_name() {
        let id = EntityTypeId::from("Shop.Order");
        assert_eq!(format!("{id}"), "Shop.Order");
    }

    #[test]
    fn serde_is_transparent() {
        let id = EntityTypeId::from("Shop.Order");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Shop.Order\"");
        let parsed: EntityTypeId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn instance_keys_order_by_raw_value() {
        assert!(InstanceKey::new(1) < InstanceKey::new(2));
        assert_eq!(InstanceKey::new(7).get(), 7);
    }
}
