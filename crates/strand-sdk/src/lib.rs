//! Embeddable Strand engine.
//!
//! [`Engine`] composes the object store, ref tables, staging workspace, graph
//! algorithms and transports into the operations an application calls:
//! `commit`, `merge`, `merge_branch`, `checkout`, `status`, `fetch`, `push`
//! and `dump_log`.
//!
//! The engine owns no global state. It is handed a [`Store`] (objects plus
//! refs) at construction and a [`Transport`] for each fetch or push:
//!
//! ```no_run
//! use std::sync::Arc;
//! use strand_sdk::{Engine, InMemoryStore, Workspace};
//!
//! # fn main() -> strand_sdk::EngineResult<()> {
//! let engine = Engine::new(Arc::new(InMemoryStore::new()));
//! let mut ws = Workspace::new();
//! ws.add("greeting", "hello")?;
//! let id = engine.commit(&mut ws, "main", "alice", "first")?;
//! assert_eq!(engine.local_branch_head("main")?, id);
//! # Ok(())
//! # }
//! ```
//!
//! # Merge reparenting
//!
//! A merge that needs a merge commit also rewrites the first commit on the
//! branch's side past the common ancestor so that its parent is the incoming
//! commit. Because ids are content-derived the rewritten commit gets a new
//! id; the original stays in the store and any other ref still pointing at
//! it keeps the old identity. The new id is reported in
//! [`MergeKind::Merged`].
//!
//! The merge commit's first parent is still the original branch head, so the
//! reparented copy is not on its first-parent history. Pushing a merge commit
//! to the remote it merged from is therefore rejected as non fast-forward.

pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod store;

#[cfg(test)]
mod scenarios;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use store::{InMemoryStore, Store};

// Re-export key types
pub use strand_index::{Status, Workspace};
pub use strand_merge::{ConflictResolution, MergeKind, MergeOutcome};
pub use strand_refs::{BranchAndHead, RefKind};
pub use strand_store::{Blob, BlobContent, Commit, ContentType};
pub use strand_sync::{
    DirectTransport, FetchResult, FramedTransport, PackServer, PushResult, Transport,
    TransportConfig,
};
pub use strand_types::ObjectId;
