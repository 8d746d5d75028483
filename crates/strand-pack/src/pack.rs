use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strand_dag::ObjectSet;
use strand_store::{Blob, Commit, ObjectStore};
use strand_types::ObjectId;
use tracing::debug;

use crate::error::{PackError, PackResult};

/// Objects written by [`UploadPack::apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackStats {
    pub commits: usize,
    pub blobs: usize,
}

/// A transferable slice of one branch's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPack {
    pub branch: String,
    pub head: ObjectId,
    pub commits: BTreeMap<ObjectId, Commit>,
    pub blobs: BTreeMap<ObjectId, Blob>,
}

impl UploadPack {
    /// Package the objects harvested by a walk ending at `head`.
    pub fn new(branch: impl Into<String>, head: ObjectId, objects: ObjectSet) -> Self {
        let (commits, blobs) = objects.into_parts();
        Self {
            branch: branch.into(),
            head,
            commits,
            blobs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.blobs.is_empty()
    }

    /// Total number of packed objects.
    pub fn len(&self) -> usize {
        self.commits.len() + self.blobs.len()
    }

    /// Check object ids and the presence of the head.
    pub fn verify(&self) -> PackResult<()> {
        for (expected, commit) in &self.commits {
            if commit.id() != *expected {
                return Err(PackError::IdMismatch {
                    expected: *expected,
                    actual: commit.id(),
                });
            }
        }
        for (expected, blob) in &self.blobs {
            if blob.id() != *expected {
                return Err(PackError::IdMismatch {
                    expected: *expected,
                    actual: blob.id(),
                });
            }
        }
        if !self.commits.contains_key(&self.head) {
            return Err(PackError::MissingHead {
                branch: self.branch.clone(),
                head: self.head,
            });
        }
        Ok(())
    }

    /// Check that every first parent and blob referenced by a packed commit
    /// is either packed or already in `store`.
    ///
    /// Second parents are not followed, matching the first-parent walks that
    /// build packs.
    pub fn verify_closure<S: ObjectStore + ?Sized>(&self, store: &S) -> PackResult<()> {
        for (id, commit) in &self.commits {
            if let Some(parent) = commit.parent() {
                if !self.commits.contains_key(&parent) && !store.exists(&parent)? {
                    return Err(PackError::MissingParent {
                        commit: *id,
                        parent,
                    });
                }
            }
            for (name, blob) in commit.index() {
                if !self.blobs.contains_key(blob) && !store.exists(blob)? {
                    return Err(PackError::MissingBlob {
                        commit: *id,
                        name: name.clone(),
                        blob: *blob,
                    });
                }
            }
        }
        Ok(())
    }

    /// Verify the pack against `store`, then write every object.
    ///
    /// Nothing is written unless both checks pass. Blobs go in before the
    /// commits that reference them.
    pub fn apply<S: ObjectStore + ?Sized>(&self, store: &S) -> PackResult<PackStats> {
        self.verify()?;
        self.verify_closure(store)?;
        for blob in self.blobs.values() {
            store.put_blob(blob)?;
        }
        for commit in self.commits.values() {
            store.put_commit(commit)?;
        }
        let stats = PackStats {
            commits: self.commits.len(),
            blobs: self.blobs.len(),
        };
        debug!(
            branch = %self.branch,
            head = %self.head.short_hex(),
            commits = stats.commits,
            blobs = stats.blobs,
            "applied upload pack"
        );
        Ok(stats)
    }
}
