use std::mem;

use docmap_model::{Cardinality, FieldDescriptor, NavigationDescriptor};
use docmap_types::{Document, EntityTypeId, FieldValue, InstanceKey, Slot, TypeError, Value};
use indexmap::IndexMap;
use tracing::debug;

use crate::entry::{Entry, NavigationValue};
use crate::error::{MapError, MapResult};
use crate::registry::{MapperPlan, MapperRegistry};
use crate::snapshot::{EntitySnapshot, NavigationSnapshot};

/// Builds and updates documents for one entity type.
///
/// Obtained from [`MapperRegistry::mapper_for`]. Nested owned types are
/// handled by recursing into the mapper the registry holds for them.
#[derive(Clone, Copy, Debug)]
pub struct DocumentMapper<'r> {
    registry: &'r MapperRegistry,
    plan: &'r MapperPlan,
}

impl<'r> DocumentMapper<'r> {
    pub(crate) fn new(registry: &'r MapperRegistry, plan: &'r MapperPlan) -> Self {
        Self { registry, plan }
    }

    pub fn entity_type(&self) -> &'r EntityTypeId {
        &self.plan.entity_type
    }

    /// Collection the type's documents are stored in.
    ///
    /// `None` for types embedded into an owner's document.
    pub fn collection_id(&self) -> Option<&'r str> {
        self.plan.collection_id.as_deref()
    }

    /// Read the entry's key field as the document key.
    pub fn document_key(&self, entry: &dyn Entry) -> MapResult<String> {
        let key_field = self.plan.key_field.as_ref().ok_or_else(|| MapError::Configuration {
            entity: self.plan.entity_type.clone(),
            reason: format!("no {:?} key field declared", self.plan.key_field_name),
        })?;

        let value = entry.current_value(&key_field.name);
        if value.is_null() {
            return Err(MapError::MissingKeyValue {
                entity: self.plan.entity_type.clone(),
                key_field: key_field.name.clone(),
            });
        }
        value.to_key_string().ok_or_else(|| MapError::TypeConversion {
            entity: self.plan.entity_type.clone(),
            field: key_field.name.clone(),
            source: TypeError::UnrepresentableValue(format!(
                "{} value cannot identify a document",
                value.kind().map_or_else(|| "null".to_string(), |k| k.to_string())
            )),
        })
    }

    /// Build a complete document for the entry and its owned dependents.
    pub fn create_document(&self, entry: &dyn Entry) -> MapResult<Document> {
        self.check_entry_type(entry)?;
        self.create_at(entry, 0)
    }

    /// Apply the entry's changes to an existing document.
    ///
    /// Only modified scalar fields are overwritten. Single owned dependents
    /// are merged into the nested document already stored (or created when
    /// none is stored); collections of owned dependents are rebuilt in full.
    /// The returned document is the authoritative result.
    pub fn update_document(&self, document: Document, entry: &dyn Entry) -> MapResult<Document> {
        self.check_entry_type(entry)?;
        self.update_at(document, entry, 0)
    }

    /// Read a stored document back into entity values.
    pub fn materialize(&self, document: &Document) -> MapResult<EntitySnapshot> {
        self.materialize_at(document, 0)
    }

    fn create_at(&self, entry: &dyn Entry, depth: usize) -> MapResult<Document> {
        self.check_depth(depth)?;

        let mut document =
            Document::with_capacity(self.plan.scalar_fields.len() + self.plan.embedded.len());
        for field in &self.plan.scalar_fields {
            document.insert(field.name.clone(), self.convert(field, entry)?);
        }

        for nav in &self.plan.embedded {
            let navigation = entry.navigation(&nav.name);
            self.expect_shape(nav, &navigation)?;
            let value = match navigation {
                NavigationValue::Absent => Value::Null,
                NavigationValue::One(key) => {
                    Value::Object(self.create_dependent(entry, nav, key, depth)?)
                }
                NavigationValue::Many(keys) => self.create_collection(entry, nav, &keys, depth)?,
            };
            document.insert(nav.name.clone(), value);
        }

        debug!(
            entity = %self.plan.entity_type,
            fields = document.len(),
            depth,
            "document created"
        );
        Ok(document)
    }

    fn update_at(
        &self,
        mut document: Document,
        entry: &dyn Entry,
        depth: usize,
    ) -> MapResult<Document> {
        self.check_depth(depth)?;

        let mut written = 0usize;
        for field in &self.plan.scalar_fields {
            if entry.is_modified(&field.name) {
                document.insert(field.name.clone(), self.convert(field, entry)?);
                written += 1;
            }
        }

        for nav in &self.plan.embedded {
            let nested = self.registry.mapper_for(&nav.declaring_type)?;
            let navigation = entry.navigation(&nav.name);
            self.expect_shape(nav, &navigation)?;
            let value = match navigation {
                NavigationValue::Absent => Value::Null,
                NavigationValue::One(key) => {
                    let dependent = self.resolve(entry, nav, key)?;
                    let merged = match document.get_mut(&nav.name) {
                        Some(Value::Object(existing)) => Some(nested.update_at(
                            mem::take(existing),
                            dependent.as_ref(),
                            depth + 1,
                        )?),
                        _ => None,
                    };
                    let nested_document = match merged {
                        Some(doc) => doc,
                        None => nested.create_at(dependent.as_ref(), depth + 1)?,
                    };
                    Value::Object(nested_document)
                }
                // Collections are rebuilt rather than merged element by element.
                NavigationValue::Many(keys) => self.create_collection(entry, nav, &keys, depth)?,
            };
            document.insert(nav.name.clone(), value);
        }

        debug!(
            entity = %self.plan.entity_type,
            scalars_written = written,
            navigations = self.plan.embedded.len(),
            depth,
            "document updated"
        );
        Ok(document)
    }

    fn create_dependent(
        &self,
        entry: &dyn Entry,
        nav: &NavigationDescriptor,
        key: InstanceKey,
        depth: usize,
    ) -> MapResult<Document> {
        let dependent = self.resolve(entry, nav, key)?;
        let mapper = self.registry.mapper_for(dependent.entity_type())?;
        mapper.create_at(dependent.as_ref(), depth + 1)
    }

    fn create_collection(
        &self,
        entry: &dyn Entry,
        nav: &NavigationDescriptor,
        keys: &[InstanceKey],
        depth: usize,
    ) -> MapResult<Value> {
        let mut items = Vec::with_capacity(keys.len());
        for key in keys {
            items.push(Value::Object(self.create_dependent(entry, nav, *key, depth)?));
        }
        Ok(Value::Array(items))
    }

    fn materialize_at(&self, document: &Document, depth: usize) -> MapResult<EntitySnapshot> {
        self.check_depth(depth)?;

        let mut values = IndexMap::with_capacity(self.plan.scalar_fields.len());
        for field in &self.plan.scalar_fields {
            let value = match document.slot(&field.name) {
                Slot::Absent | Slot::Null => FieldValue::Null,
                Slot::Scalar(scalar) => FieldValue::from_scalar(scalar, field.kind)
                    .map_err(|source| self.conversion_error(field, source))?,
                Slot::Object(_) | Slot::Array(_) => {
                    let found = document.get(&field.name).map_or("nothing", Value::type_name);
                    return Err(self.conversion_error(
                        field,
                        TypeError::KindMismatch {
                            expected: field.kind,
                            found,
                        },
                    ));
                }
            };
            values.insert(field.name.clone(), value);
        }

        let mut navigations = IndexMap::with_capacity(self.plan.embedded.len());
        for nav in &self.plan.embedded {
            let nested = self.registry.mapper_for(&nav.declaring_type)?;
            let snapshot = match (nav.cardinality, document.slot(&nav.name)) {
                (_, Slot::Absent | Slot::Null) => NavigationSnapshot::Absent,
                (Cardinality::One, Slot::Object(doc)) => {
                    NavigationSnapshot::One(Box::new(nested.materialize_at(doc, depth + 1)?))
                }
                (Cardinality::Many, Slot::Array(items)) => {
                    let mut snapshots = Vec::with_capacity(items.len());
                    for item in items {
                        let doc = item.as_object().ok_or_else(|| MapError::ShapeMismatch {
                            entity: self.plan.entity_type.clone(),
                            navigation: nav.name.clone(),
                            expected: Cardinality::Many,
                            found: "an array element that is not an object",
                        })?;
                        snapshots.push(nested.materialize_at(doc, depth + 1)?);
                    }
                    NavigationSnapshot::Many(snapshots)
                }
                (expected, _) => {
                    return Err(MapError::ShapeMismatch {
                        entity: self.plan.entity_type.clone(),
                        navigation: nav.name.clone(),
                        expected,
                        found: document.get(&nav.name).map_or("nothing", Value::type_name),
                    });
                }
            };
            navigations.insert(nav.name.clone(), snapshot);
        }

        Ok(EntitySnapshot {
            entity_type: self.plan.entity_type.clone(),
            values,
            navigations,
        })
    }

    fn convert(&self, field: &FieldDescriptor, entry: &dyn Entry) -> MapResult<Value> {
        entry
            .current_value(&field.name)
            .to_value()
            .map_err(|source| self.conversion_error(field, source))
    }

    fn conversion_error(&self, field: &FieldDescriptor, source: TypeError) -> MapError {
        MapError::TypeConversion {
            entity: self.plan.entity_type.clone(),
            field: field.name.clone(),
            source,
        }
    }

    fn resolve<'e>(
        &self,
        entry: &'e dyn Entry,
        nav: &NavigationDescriptor,
        key: InstanceKey,
    ) -> MapResult<Box<dyn Entry + 'e>> {
        entry
            .resolve_entry(key, &nav.declaring_type)
            .ok_or_else(|| MapError::Unresolved {
                navigation: nav.name.clone(),
                declaring_type: nav.declaring_type.clone(),
                instance: key,
            })
    }

    fn expect_shape(&self, nav: &NavigationDescriptor, value: &NavigationValue) -> MapResult<()> {
        let matches = match value {
            NavigationValue::Absent => true,
            NavigationValue::One(_) => nav.cardinality == Cardinality::One,
            NavigationValue::Many(_) => nav.cardinality == Cardinality::Many,
        };
        if matches {
            return Ok(());
        }
        Err(MapError::ShapeMismatch {
            entity: self.plan.entity_type.clone(),
            navigation: nav.name.clone(),
            expected: nav.cardinality,
            found: value.shape_name(),
        })
    }

    fn check_depth(&self, depth: usize) -> MapResult<()> {
        let limit = self.registry.max_nesting_depth();
        if depth > limit {
            return Err(MapError::NestingTooDeep {
                entity: self.plan.entity_type.clone(),
                limit,
            });
        }
        Ok(())
    }

    fn check_entry_type(&self, entry: &dyn Entry) -> MapResult<()> {
        if entry.entity_type() == &self.plan.entity_type {
            return Ok(());
        }
        Err(MapError::Configuration {
            entity: self.plan.entity_type.clone(),
            reason: format!("entry of type {} passed to this mapper", entry.entity_type()),
        })
    }
}
