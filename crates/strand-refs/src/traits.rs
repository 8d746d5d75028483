//! The [`RefStore`] trait: storage interface for branch heads.

use strand_types::ObjectId;

use crate::error::{RefError, Result};
use crate::types::{BranchAndHead, RefKind};

/// Storage backend for the local and remote ref tables.
///
/// Implementations must be thread-safe (`Send + Sync`) and must make
/// [`RefStore::set_ref`] atomic per branch: the comparison against
/// `expected` and the write happen in one critical section.
pub trait RefStore: Send + Sync {
    /// Current head of `branch`, or `None` if the branch has no commits.
    fn get_ref(&self, kind: RefKind, branch: &str) -> Result<Option<ObjectId>>;

    /// Move `branch` from `expected` to `new`.
    ///
    /// Fails with [`RefError::Conflict`] if the current head is not exactly
    /// `expected` (`None` meaning "branch does not exist yet").
    fn set_ref(
        &self,
        kind: RefKind,
        branch: &str,
        expected: Option<ObjectId>,
        new: ObjectId,
    ) -> Result<()>;

    /// Every branch in the table, sorted by name.
    fn list_refs(&self, kind: RefKind) -> Result<Vec<BranchAndHead>>;

    /// Delete a branch. Returns `true` if it existed.
    fn remove_ref(&self, kind: RefKind, branch: &str) -> Result<bool>;

    /// Delete every branch in both tables.
    fn wipe_refs(&self) -> Result<()>;

    /// The branch paired with its current head.
    fn branch_and_head(&self, kind: RefKind, branch: &str) -> Result<BranchAndHead> {
        Ok(BranchAndHead::new(branch, self.get_ref(kind, branch)?))
    }

    /// Current head of `branch`, failing with [`RefError::NotFound`] if the
    /// branch is absent.
    fn require_ref(&self, kind: RefKind, branch: &str) -> Result<ObjectId> {
        self.get_ref(kind, branch)?.ok_or_else(|| RefError::NotFound {
            kind,
            branch: branch.to_string(),
        })
    }
}
