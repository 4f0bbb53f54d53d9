use std::collections::HashMap;

use docmap_types::EntityTypeId;
use indexmap::IndexMap;

use crate::config::MapperConfig;
use crate::descriptor::EntityTypeDescriptor;
use crate::error::{ModelError, ModelResult};

/// Immutable registry of entity type descriptors.
///
/// Built by [`ModelBuilder`](crate::ModelBuilder). Lookups are by type
/// identity; iteration follows declaration order.
#[derive(Clone, Debug)]
pub struct EntityModel {
    config: MapperConfig,
    types: IndexMap<EntityTypeId, EntityTypeDescriptor>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl EntityModel {
    pub(crate) fn new(
        config: MapperConfig,
        types: IndexMap<EntityTypeId, EntityTypeDescriptor>,
    ) -> Self {
        Self { config, types }
    }

    /// The configuration the model was built with.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn get(&self, id: &EntityTypeId) -> Option<&EntityTypeDescriptor> {
        self.types.get(id)
    }

    /// Like [`Self::get`], but an unknown type is an error.
    pub fn descriptor(&self, id: &EntityTypeId) -> ModelResult<&EntityTypeDescriptor> {
        self.types
            .get(id)
            .ok_or_else(|| ModelError::UnknownEntityType(id.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityTypeDescriptor> {
        self.types.values()
    }

    /// Types stored as their own top-level documents.
    pub fn document_roots(&self) -> impl Iterator<Item = &EntityTypeDescriptor> {
        self.types.values().filter(|t| t.is_document_root())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Fail if following embedded navigations can lead back to a type
    /// already on the path.
    pub(crate) fn check_acyclic(&self) -> ModelResult<()> {
        let mut state: HashMap<&EntityTypeId, Visit> = HashMap::new();
        let mut path: Vec<&EntityTypeId> = Vec::new();
        for id in self.types.keys() {
            self.visit(id, &mut state, &mut path)?;
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        id: &'a EntityTypeId,
        state: &mut HashMap<&'a EntityTypeId, Visit>,
        path: &mut Vec<&'a EntityTypeId>,
    ) -> ModelResult<()> {
        match state.get(id) {
            Some(Visit::Done) => return Ok(()),
            Some(Visit::InProgress) => {
                let start = path.iter().position(|p| *p == id).unwrap_or(0);
                let mut names: Vec<&str> = path[start..].iter().map(|p| p.as_str()).collect();
                names.push(id.as_str());
                return Err(ModelError::OwnershipCycle {
                    path: names.join(" -> "),
                });
            }
            None => {}
        }

        state.insert(id, Visit::InProgress);
        path.push(id);
        if let Some(descriptor) = self.types.get(id) {
            for nav in descriptor.embedded_navigations() {
                self.visit(&nav.declaring_type, state, path)?;
            }
        }
        path.pop();
        state.insert(id, Visit::Done);
        Ok(())
    }
}
