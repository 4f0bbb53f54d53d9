//! Entity type metadata for docmap.
//!
//! The mapper never discovers types at call time. Instead, a surrounding
//! mapping layer declares its entity types once through [`ModelBuilder`],
//! which validates the ownership graph and produces an immutable
//! [`EntityModel`] of plain [`EntityTypeDescriptor`] records.
//!
//! # Rules Applied at Build Time
//!
//! 1. A type is a document root when nothing owns it, or when it is owned
//!    but names its own collection.
//! 2. Document roots get a collection name: the explicit one, else the
//!    configured default, else the type's short name.
//! 3. Every document root declares the configured key field.
//! 4. The graph of embedded ownership relationships is acyclic.

pub mod builder;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod model;

pub use builder::{EntityBuilder, ModelBuilder};
pub use config::MapperConfig;
pub use descriptor::{
    Cardinality, EntityTypeDescriptor, FieldDescriptor, NavigationDescriptor, NavigationDirection,
};
pub use error::{ModelError, ModelResult};
pub use model::EntityModel;
