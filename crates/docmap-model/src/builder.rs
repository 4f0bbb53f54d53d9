use std::collections::HashSet;

use docmap_types::{EntityTypeId, ScalarKind};
use indexmap::IndexMap;
use tracing::debug;

use crate::config::MapperConfig;
use crate::descriptor::{
    Cardinality, EntityTypeDescriptor, FieldDescriptor, NavigationDescriptor, NavigationDirection,
};
use crate::error::{ModelError, ModelResult};
use crate::model::EntityModel;

/// Declares the scalar fields and collection of one entity type.
#[derive(Debug, Default)]
pub struct EntityBuilder {
    fields: Vec<FieldDescriptor>,
    collection: Option<String>,
}

impl EntityBuilder {
    /// Declare a scalar field.
    pub fn field(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, kind));
        self
    }

    /// Store this type in its own collection.
    ///
    /// An owned type with an explicit collection becomes a document root and
    /// is no longer embedded into its owner's document.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }
}

#[derive(Debug)]
struct PendingType {
    id: EntityTypeId,
    fields: Vec<FieldDescriptor>,
    collection: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RelationshipKind {
    Owns(Cardinality),
    References(Cardinality),
    Owner,
}

#[derive(Debug)]
struct PendingRelationship {
    from: EntityTypeId,
    name: String,
    to: EntityTypeId,
    kind: RelationshipKind,
}

/// Builds an [`EntityModel`] from type and relationship declarations.
///
/// ```
/// use docmap_model::{MapperConfig, ModelBuilder};
/// use docmap_types::ScalarKind;
///
/// let model = ModelBuilder::new(MapperConfig::default())
///     .entity("Shop.Order", |e| {
///         e.field("id", ScalarKind::Text).field("total", ScalarKind::F64)
///     })
///     .entity("Shop.Address", |e| {
///         e.field("street", ScalarKind::Text).field("city", ScalarKind::Text)
///     })
///     .owns_one("Shop.Order", "address", "Shop.Address")
///     .build()
///     .unwrap();
///
/// assert!(model.get(&"Shop.Order".into()).unwrap().is_document_root());
/// assert!(!model.get(&"Shop.Address".into()).unwrap().is_document_root());
/// ```
#[derive(Debug)]
pub struct ModelBuilder {
    config: MapperConfig,
    types: Vec<PendingType>,
    relationships: Vec<PendingRelationship>,
}

impl ModelBuilder {
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            types: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Declare an entity type.
    pub fn entity(
        mut self,
        id: impl Into<EntityTypeId>,
        declare: impl FnOnce(EntityBuilder) -> EntityBuilder,
    ) -> Self {
        let built = declare(EntityBuilder::default());
        self.types.push(PendingType {
            id: id.into(),
            fields: built.fields,
            collection: built.collection,
        });
        self
    }

    /// `owner` owns a single `dependent` reachable through `navigation`.
    pub fn owns_one(
        self,
        owner: impl Into<EntityTypeId>,
        navigation: impl Into<String>,
        dependent: impl Into<EntityTypeId>,
    ) -> Self {
        self.relationship(owner, navigation, dependent, RelationshipKind::Owns(Cardinality::One))
    }

    /// `owner` owns a collection of `dependent` instances.
    pub fn owns_many(
        self,
        owner: impl Into<EntityTypeId>,
        navigation: impl Into<String>,
        dependent: impl Into<EntityTypeId>,
    ) -> Self {
        self.relationship(owner, navigation, dependent, RelationshipKind::Owns(Cardinality::Many))
    }

    /// A navigation from an owned `dependent` back to its `owner`.
    pub fn owner_navigation(
        self,
        dependent: impl Into<EntityTypeId>,
        navigation: impl Into<String>,
        owner: impl Into<EntityTypeId>,
    ) -> Self {
        self.relationship(dependent, navigation, owner, RelationshipKind::Owner)
    }

    /// A plain (non-ownership) navigation to a single instance of `target`.
    pub fn references_one(
        self,
        from: impl Into<EntityTypeId>,
        navigation: impl Into<String>,
        target: impl Into<EntityTypeId>,
    ) -> Self {
        self.relationship(
            from,
            navigation,
            target,
            RelationshipKind::References(Cardinality::One),
        )
    }

    /// A plain (non-ownership) navigation to many instances of `target`.
    pub fn references_many(
        self,
        from: impl Into<EntityTypeId>,
        navigation: impl Into<String>,
        target: impl Into<EntityTypeId>,
    ) -> Self {
        self.relationship(
            from,
            navigation,
            target,
            RelationshipKind::References(Cardinality::Many),
        )
    }

    fn relationship(
        mut self,
        from: impl Into<EntityTypeId>,
        name: impl Into<String>,
        to: impl Into<EntityTypeId>,
        kind: RelationshipKind,
    ) -> Self {
        self.relationships.push(PendingRelationship {
            from: from.into(),
            name: name.into(),
            to: to.into(),
            kind,
        });
        self
    }

    /// Validate the declarations and produce the model.
    pub fn build(self) -> ModelResult<EntityModel> {
        self.config.validate()?;

        let mut declared: IndexMap<EntityTypeId, PendingType> = IndexMap::new();
        for pending in self.types {
            if declared.contains_key(&pending.id) {
                return Err(ModelError::DuplicateEntityType(pending.id));
            }
            declared.insert(pending.id.clone(), pending);
        }

        for rel in &self.relationships {
            for end in [&rel.from, &rel.to] {
                if !declared.contains_key(end) {
                    return Err(ModelError::UnknownEntityType(end.clone()));
                }
            }
        }

        let owned: HashSet<&EntityTypeId> = self
            .relationships
            .iter()
            .filter(|r| matches!(r.kind, RelationshipKind::Owns(_)))
            .map(|r| &r.to)
            .collect();

        let is_root =
            |id: &EntityTypeId| !owned.contains(id) || declared[id].collection.is_some();

        let mut types = IndexMap::with_capacity(declared.len());
        for (id, pending) in &declared {
            let navigations: Vec<NavigationDescriptor> = self
                .relationships
                .iter()
                .filter(|r| &r.from == id)
                .map(|r| navigation_for(r, is_root(&r.to)))
                .collect();

            let mut seen = HashSet::new();
            let names = pending
                .fields
                .iter()
                .map(|f| &f.name)
                .chain(navigations.iter().map(|n| &n.name));
            for name in names {
                if !seen.insert(name.as_str()) {
                    return Err(ModelError::DuplicateName {
                        entity: id.clone(),
                        name: name.clone(),
                    });
                }
            }

            let document_root = is_root(id);
            if document_root && !pending.fields.iter().any(|f| f.name == self.config.key_field) {
                return Err(ModelError::MissingKeyField {
                    entity: id.clone(),
                    key_field: self.config.key_field.clone(),
                });
            }

            let collection = document_root.then(|| {
                pending
                    .collection
                    .clone()
                    .or_else(|| self.config.default_collection.clone())
                    .unwrap_or_else(|| id.short_name().to_string())
            });

            types.insert(
                id.clone(),
                EntityTypeDescriptor {
                    id: id.clone(),
                    fields: pending.fields.clone(),
                    navigations,
                    collection,
                    document_root,
                    key_field: self.config.key_field.clone(),
                    raw_document_field: self.config.raw_document_field.clone(),
                },
            );
        }

        let model = EntityModel::new(self.config, types);
        model.check_acyclic()?;
        debug!(
            types = model.len(),
            roots = model.document_roots().count(),
            "entity model built"
        );
        Ok(model)
    }
}

fn navigation_for(rel: &PendingRelationship, target_is_root: bool) -> NavigationDescriptor {
    match rel.kind {
        RelationshipKind::Owns(cardinality) => NavigationDescriptor {
            name: rel.name.clone(),
            cardinality,
            direction: NavigationDirection::PrincipalToDependent,
            declaring_type: rel.to.clone(),
            ownership: true,
            target_is_document_root: target_is_root,
        },
        RelationshipKind::References(cardinality) => NavigationDescriptor {
            name: rel.name.clone(),
            cardinality,
            direction: NavigationDirection::PrincipalToDependent,
            declaring_type: rel.to.clone(),
            ownership: false,
            target_is_document_root: target_is_root,
        },
        // The dependent declares the relationship it navigates out of.
        RelationshipKind::Owner => NavigationDescriptor {
            name: rel.name.clone(),
            cardinality: Cardinality::One,
            direction: NavigationDirection::DependentToPrincipal,
            declaring_type: rel.from.clone(),
            ownership: true,
            target_is_document_root: target_is_root,
        },
    }
}
