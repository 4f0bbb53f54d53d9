//! Plain-data descriptors of entity types.
//!
//! Descriptors are produced by [`ModelBuilder`](crate::ModelBuilder) and never
//! change afterwards. The mapper enumerates them once when it is constructed.

use docmap_types::{EntityTypeId, ScalarKind};
use serde::{Deserialize, Serialize};

/// A scalar field of an entity type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: ScalarKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Shape of a relationship as seen from the navigating side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// One related instance (a unique relationship).
    One,
    /// A collection of related instances.
    Many,
}

/// Which end of the relationship the navigation starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationDirection {
    /// From the owner (principal) to the owned dependent.
    PrincipalToDependent,
    /// From the dependent back to its principal.
    DependentToPrincipal,
}

/// A navigation from one entity type to related instances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationDescriptor {
    pub name: String,
    pub cardinality: Cardinality,
    pub direction: NavigationDirection,
    /// The dependent type of the relationship.
    pub declaring_type: EntityTypeId,
    /// `true` when the dependent's lifetime is scoped to its owner.
    pub ownership: bool,
    /// `true` when the dependent type is stored as its own document.
    pub target_is_document_root: bool,
}

impl NavigationDescriptor {
    /// Returns `true` when the related instances are embedded into the
    /// navigating entity's document.
    ///
    /// That holds for ownership relationships navigated from the principal
    /// side whose dependent type is not a document root.
    pub fn is_embedded(&self) -> bool {
        self.ownership
            && self.direction == NavigationDirection::PrincipalToDependent
            && !self.target_is_document_root
    }

    pub fn is_dependent_to_principal(&self) -> bool {
        self.direction == NavigationDirection::DependentToPrincipal
    }
}

/// Everything the mapper needs to know about one entity type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeDescriptor {
    pub(crate) id: EntityTypeId,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) navigations: Vec<NavigationDescriptor>,
    pub(crate) collection: Option<String>,
    pub(crate) document_root: bool,
    pub(crate) key_field: String,
    pub(crate) raw_document_field: String,
}

impl EntityTypeDescriptor {
    pub fn id(&self) -> &EntityTypeId {
        &self.id
    }

    /// Every declared scalar field, reserved ones included.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Scalar fields written into document bodies, in declaration order.
    ///
    /// The key field and the raw-document shadow field are excluded.
    pub fn scalar_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.name != self.key_field && f.name != self.raw_document_field)
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The identity field, if this type declares one.
    pub fn key_field(&self) -> Option<&FieldDescriptor> {
        self.find_field(&self.key_field)
    }

    pub fn key_field_name(&self) -> &str {
        &self.key_field
    }

    /// Every navigation, in declaration order.
    pub fn navigations(&self) -> &[NavigationDescriptor] {
        &self.navigations
    }

    pub fn find_navigation(&self, name: &str) -> Option<&NavigationDescriptor> {
        self.navigations.iter().find(|n| n.name == name)
    }

    /// Navigations whose targets are embedded into this type's documents.
    pub fn embedded_navigations(&self) -> impl Iterator<Item = &NavigationDescriptor> {
        self.navigations.iter().filter(|n| n.is_embedded())
    }

    /// Returns `true` when instances of this type are stored as their own
    /// top-level documents.
    pub fn is_document_root(&self) -> bool {
        self.document_root
    }

    /// The collection name, present only for document roots.
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(direction: NavigationDirection, ownership: bool, root: bool) -> NavigationDescriptor {
        NavigationDescriptor {
            name: "address".into(),
            cardinality: Cardinality::One,
            direction,
            declaring_type: EntityTypeId::new("Shop.Address"),
            ownership,
            target_is_document_root: root,
        }
    }

    #[test]
    fn owned_principal_navigation_is_embedded() {
        assert!(nav(NavigationDirection::PrincipalToDependent, true, false).is_embedded());
    }

    #[test]
    fn dependent_to_principal_is_not_embedded() {
        let n = nav(NavigationDirection::DependentToPrincipal, true, false);
        assert!(n.is_dependent_to_principal());
        assert!(!n.is_embedded());
    }

    #[test]
    fn non_ownership_is_not_embedded() {
        assert!(!nav(NavigationDirection::PrincipalToDependent, false, false).is_embedded());
    }

    #[test]
    fn document_root_target_is_not_embedded() {
        assert!(!nav(NavigationDirection::PrincipalToDependent, true, true).is_embedded());
    }

    #[test]
    fn scalar_fields_skip_reserved_names() {
        let descriptor = EntityTypeDescriptor {
            id: EntityTypeId::new("Shop.Order"),
            fields: vec![
                FieldDescriptor::new("id", ScalarKind::Text),
                FieldDescriptor::new("total", ScalarKind::F64),
                FieldDescriptor::new("__jObject", ScalarKind::Text),
            ],
            navigations: Vec::new(),
            collection: Some("Order".into()),
            document_root: true,
            key_field: "id".into(),
            raw_document_field: "__jObject".into(),
        };
        let names: Vec<_> = descriptor.scalar_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["total"]);
        assert_eq!(descriptor.key_field().unwrap().kind, ScalarKind::Text);
    }
}
