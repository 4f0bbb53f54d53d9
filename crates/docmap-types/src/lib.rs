//! Foundation types for docmap.
//!
//! This crate provides the document tree and value types shared by every
//! other docmap crate. Every other docmap crate depends on `docmap-types`.
//!
//! # Key Types
//!
//! - [`Document`] -- Ordered field map representing one root entity and all of
//!   its embedded owned dependents
//! - [`Value`] -- Tagged document value: null, scalar, nested object, or array
//! - [`Slot`] -- Borrowed view of a document field that also names `Absent`
//! - [`Scalar`] -- Native scalar representation stored in documents
//! - [`FieldValue`] -- Runtime value read from a tracked entity entry
//! - [`ScalarKind`] -- Declared kind of a scalar field, used to decode documents
//! - [`EntityTypeId`] -- Stable name of an entity type
//! - [`InstanceKey`] -- Opaque handle to one tracked entity instance

pub mod document;
pub mod error;
pub mod field_value;
pub mod ids;
pub mod json;
pub mod value;

pub use document::Document;
pub use error::{TypeError, TypeResult};
pub use field_value::{FieldValue, ScalarKind};
pub use ids::{EntityTypeId, InstanceKey};
pub use value::{Scalar, Slot, Value};
