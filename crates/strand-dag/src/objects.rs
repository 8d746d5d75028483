//! Accumulator for [`crate::collect_objects`].

use std::collections::BTreeMap;

use strand_store::{Blob, Commit};
use strand_types::ObjectId;

/// Commits and blobs harvested by a walk, deduplicated by id.
///
/// Either half can be switched off when the caller only needs the other.
#[derive(Clone, Debug)]
pub struct ObjectSet {
    pub commits: BTreeMap<ObjectId, Commit>,
    pub blobs: BTreeMap<ObjectId, Blob>,
    collect_commits: bool,
    collect_blobs: bool,
}

impl ObjectSet {
    /// Collect both commits and blobs.
    pub fn new() -> Self {
        Self::with_kinds(true, true)
    }

    /// Collect commits only; blob references are not resolved.
    pub fn commits_only() -> Self {
        Self::with_kinds(true, false)
    }

    /// Collect blobs only.
    pub fn blobs_only() -> Self {
        Self::with_kinds(false, true)
    }

    fn with_kinds(collect_commits: bool, collect_blobs: bool) -> Self {
        Self {
            commits: BTreeMap::new(),
            blobs: BTreeMap::new(),
            collect_commits,
            collect_blobs,
        }
    }

    pub fn collects_commits(&self) -> bool {
        self.collect_commits
    }

    pub fn collects_blobs(&self) -> bool {
        self.collect_blobs
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.blobs.is_empty()
    }

    /// Total number of objects held.
    pub fn len(&self) -> usize {
        self.commits.len() + self.blobs.len()
    }

    pub fn into_parts(self) -> (BTreeMap<ObjectId, Commit>, BTreeMap<ObjectId, Blob>) {
        (self.commits, self.blobs)
    }
}

impl Default for ObjectSet {
    fn default() -> Self {
        Self::new()
    }
}
