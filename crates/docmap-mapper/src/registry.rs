use std::sync::Arc;

use docmap_model::{
    EntityModel, EntityTypeDescriptor, FieldDescriptor, ModelError, NavigationDescriptor,
};
use docmap_types::EntityTypeId;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::MapResult;
use crate::mapper::DocumentMapper;

/// Per-type data a [`DocumentMapper`] works from, computed once.
#[derive(Debug)]
pub(crate) struct MapperPlan {
    pub(crate) entity_type: EntityTypeId,
    pub(crate) collection_id: Option<String>,
    pub(crate) key_field: Option<FieldDescriptor>,
    pub(crate) key_field_name: String,
    pub(crate) scalar_fields: Vec<FieldDescriptor>,
    pub(crate) embedded: Vec<NavigationDescriptor>,
}

impl MapperPlan {
    fn new(descriptor: &EntityTypeDescriptor) -> Self {
        Self {
            entity_type: descriptor.id().clone(),
            collection_id: descriptor.collection().map(str::to_string),
            key_field: descriptor.key_field().cloned(),
            key_field_name: descriptor.key_field_name().to_string(),
            scalar_fields: descriptor.scalar_fields().cloned().collect(),
            embedded: descriptor.embedded_navigations().cloned().collect(),
        }
    }
}

/// One document mapper per entity type, keyed by type identity.
///
/// The registry is immutable after construction and can be shared across
/// threads; mappers borrowed from it hold no per-call state.
#[derive(Debug)]
pub struct MapperRegistry {
    model: Arc<EntityModel>,
    plans: IndexMap<EntityTypeId, MapperPlan>,
}

impl MapperRegistry {
    /// Precompute a mapper for every type in the model.
    pub fn new(model: impl Into<Arc<EntityModel>>) -> Self {
        let model = model.into();
        let plans: IndexMap<EntityTypeId, MapperPlan> = model
            .iter()
            .map(|descriptor| (descriptor.id().clone(), MapperPlan::new(descriptor)))
            .collect();
        debug!(mappers = plans.len(), "mapper registry built");
        Self { model, plans }
    }

    /// The mapper responsible for `entity_type`.
    pub fn mapper_for(&self, entity_type: &EntityTypeId) -> MapResult<DocumentMapper<'_>> {
        let plan = self
            .plans
            .get(entity_type)
            .ok_or_else(|| ModelError::UnknownEntityType(entity_type.clone()))?;
        Ok(DocumentMapper::new(self, plan))
    }

    pub fn model(&self) -> &EntityModel {
        &self.model
    }

    /// Deepest allowed chain of embedded documents below a root.
    pub fn max_nesting_depth(&self) -> usize {
        self.model.config().max_nesting_depth
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
