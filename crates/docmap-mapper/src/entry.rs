use docmap_types::{EntityTypeId, FieldValue, InstanceKey};

/// Current value of a navigation on an entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationValue {
    /// No related instance (or no collection) is attached.
    Absent,
    /// A single related instance.
    One(InstanceKey),
    /// A collection of related instances, in the owning collection's order.
    Many(Vec<InstanceKey>),
}

impl NavigationValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, NavigationValue::Absent)
    }

    pub(crate) fn shape_name(&self) -> &'static str {
        match self {
            NavigationValue::Absent => "nothing",
            NavigationValue::One(_) => "a single instance",
            NavigationValue::Many(_) => "a collection",
        }
    }
}

impl From<Option<InstanceKey>> for NavigationValue {
    fn from(key: Option<InstanceKey>) -> Self {
        key.map_or(NavigationValue::Absent, NavigationValue::One)
    }
}

/// Live handle to one tracked entity instance.
///
/// The surrounding change tracker owns entries; the mapper only borrows one
/// for the duration of a single create or update call and never retains it.
pub trait Entry {
    /// The runtime type of the instance.
    fn entity_type(&self) -> &EntityTypeId;

    /// Current value of a scalar field. Unset fields read as
    /// [`FieldValue::Null`].
    fn current_value(&self, field: &str) -> FieldValue;

    /// Whether the field changed since the instance was last saved.
    fn is_modified(&self, field: &str) -> bool;

    /// Current value of a navigation.
    fn navigation(&self, name: &str) -> NavigationValue;

    /// Resolve a related instance into its entry.
    ///
    /// Returns `None` when the instance is not tracked as `declaring_type`.
    fn resolve_entry(
        &self,
        instance: InstanceKey,
        declaring_type: &EntityTypeId,
    ) -> Option<Box<dyn Entry + '_>>;
}
