//! Commit graph algorithms for Strand.
//!
//! Every algorithm walks parent links through an [`ObjectStore`] one hop at
//! a time; none of them loads the whole graph. Walks follow the first parent
//! only.
//!
//! - [`can_fast_forward`] -- is `to` an ancestor of (or equal to) `from`?
//! - [`collect_objects`] -- the commits and blobs between two heads
//! - [`find_pre_intersection`] -- the commit on one path just past the point
//!   where it meets another
//! - [`Ancestry`] -- first-parent history, newest first
//!
//! A parent or blob id that resolves to nothing means the store is
//! inconsistent and is reported as [`DagError::MissingCommit`] or
//! [`DagError::MissingBlob`], never as a shorter history.
//!
//! [`ObjectStore`]: strand_store::ObjectStore

pub mod ancestry;
pub mod error;
pub mod graph;
pub mod objects;

pub use ancestry::{load_commit, Ancestry};
pub use error::{DagError, DagResult};
pub use graph::{can_fast_forward, collect_objects, find_pre_intersection};
pub use objects::ObjectSet;
