//! Merge engine for Strand.
//!
//! Merging an incoming commit into a branch head goes through three stages:
//!
//! 1. Trivial cases: an empty branch adopts the incoming commit, a head the
//!    incoming commit descends from fast-forwards, and an incoming commit
//!    already in the head's history changes nothing.
//! 2. [`auto_merge`] combines the two flat indexes name by name, reporting
//!    every name whose blobs differ as a conflict and settling it according
//!    to a [`ConflictResolution`].
//! 3. [`plan_merge`] turns the result into the commits to write: a merge
//!    commit with both heads as parents, plus a copy of the pre-intersection
//!    commit reparented onto the incoming head.
//!
//! # Reparenting
//!
//! The pre-intersection commit (the first commit on the branch's side past
//! the common ancestor) is rewritten with the incoming commit as its parent.
//! Because ids are content-derived this yields a *new* commit; the original
//! stays valid under its old id, and its descendants, including the current
//! head, keep pointing at it. Any other ref naming the original is unaffected
//! but now disagrees with the reparented copy.
//!
//! Planning never writes. The caller stores [`MergePlan::writes`] and then
//! moves the branch ref with a compare-and-swap.

pub mod auto;
pub mod error;
pub mod plan;
pub mod resolution;

pub use auto::{auto_merge, AutoMerge};
pub use error::{MergeError, MergeResult};
pub use plan::{plan_merge, MergeKind, MergeOutcome, MergePlan, MergeSignature};
pub use resolution::ConflictResolution;
