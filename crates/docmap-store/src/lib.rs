//! Document storage for docmap.
//!
//! Stores the documents produced by `docmap-mapper` keyed by
//! `(collection, key)` and drives saves from a change tracker.
//!
//! # Storage Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`InMemoryDocumentStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Saving
//!
//! [`DocumentWriter`] walks the tracked document roots and, by state,
//! creates, merges and replaces, or deletes their documents.

pub mod error;
pub mod memory;
pub mod traits;
pub mod writer;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDocumentStore;
pub use traits::DocumentStore;
pub use writer::{DocumentWriter, SaveSummary};
