//! Content-addressed object storage for Strand.
//!
//! Two kinds of immutable objects live in the store, each identified by the
//! BLAKE3 hash of its canonical encoding (domain-separated by kind):
//!
//! - [`Blob`] -- a named payload, classified as text, binary or structured
//! - [`Commit`] -- a flat name-to-blob index plus authorship and parent links
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent: storing an object that already exists is a no-op.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. Typed reads re-derive the id of the decoded object and reject mismatches.
//! 5. All backend errors are propagated, never silently ignored.

pub mod blob;
pub mod commit;
pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use blob::{Blob, BlobContent, ContentType};
pub use commit::{Commit, CommitBuilder, Index};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{Object, ObjectKind, StoredObject};
pub use traits::ObjectStore;
