//! Document mapper for docmap.
//!
//! Converts a tracked entity (an [`Entry`]) and everything it owns into one
//! hierarchical [`Document`](docmap_types::Document), and applies partial
//! updates to a previously stored document.
//!
//! # Mapping Rules
//!
//! 1. A document body carries every scalar field except the key field and
//!    the raw-document field; the key travels beside the document.
//! 2. Embedded navigations (ownership, principal to dependent, target not a
//!    document root) are always written, as `null` when nothing is attached.
//! 3. Update writes only modified scalars, merges single dependents into
//!    the nested document already stored, and rebuilds collections.
//! 4. Unresolvable dependents and unconvertible values abort the whole
//!    operation; no partial document is returned.
//!
//! # Getting a Mapper
//!
//! Build a [`MapperRegistry`] from an [`EntityModel`](docmap_model::EntityModel)
//! once, then borrow a [`DocumentMapper`] per entity type with
//! [`MapperRegistry::mapper_for`]. [`ChangeTracker`] is an in-memory
//! [`Entry`] source for embedding and tests.

pub mod entry;
pub mod error;
pub mod mapper;
pub mod memory;
pub mod registry;
pub mod snapshot;

pub use entry::{Entry, NavigationValue};
pub use error::{MapError, MapResult};
pub use mapper::DocumentMapper;
pub use memory::{ChangeTracker, EntityState, TrackedEntity, TrackedEntry};
pub use registry::MapperRegistry;
pub use snapshot::{EntitySnapshot, NavigationSnapshot};
