//! Merge planning: decide how a branch head absorbs an incoming commit.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strand_dag::{can_fast_forward, find_pre_intersection, load_commit};
use strand_store::{Commit, ObjectStore};
use strand_types::ObjectId;
use tracing::debug;

use crate::auto::auto_merge;
use crate::error::{MergeError, MergeResult};
use crate::resolution::ConflictResolution;

/// Authorship stamped on a merge commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeSignature {
    pub author: String,
    pub committer: String,
    pub message: String,
}

impl MergeSignature {
    /// Signature whose committer is the author.
    pub fn new(author: impl Into<String>, message: impl Into<String>) -> Self {
        let author = author.into();
        Self {
            committer: author.clone(),
            author,
            message: message.into(),
        }
    }

    pub fn with_committer(mut self, committer: impl Into<String>) -> Self {
        self.committer = committer.into();
        self
    }
}

/// How the branch absorbed the incoming commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeKind {
    /// The branch was empty and now points at the incoming commit.
    Initialized,
    /// The incoming commit descends from the head; the branch moved to it.
    FastForward,
    /// A merge commit was written.
    Merged {
        commit: ObjectId,
        /// The reparented copy of the pre-intersection commit, if one was made.
        reparented: Option<ObjectId>,
    },
    /// Conflicts were left unresolved; nothing was written.
    Unresolved,
}

/// Result of a merge as seen by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub kind: MergeKind,
    /// The branch head after the merge.
    pub head: ObjectId,
    /// Names whose blobs differed, whether or not the policy settled them.
    pub conflicts: BTreeSet<String>,
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Returns `true` if the branch head moved.
    pub fn moved(&self) -> bool {
        !matches!(self.kind, MergeKind::Unresolved)
    }
}

/// Commits to store and the outcome to publish once the ref has moved.
#[derive(Clone, Debug)]
pub struct MergePlan {
    pub outcome: MergeOutcome,
    /// Commits to write before the ref update, in order.
    pub writes: Vec<Commit>,
}

impl MergePlan {
    fn without_writes(kind: MergeKind, head: ObjectId) -> Self {
        Self {
            outcome: MergeOutcome {
                kind,
                head,
                conflicts: BTreeSet::new(),
            },
            writes: Vec::new(),
        }
    }
}

/// Plan merging `incoming` into a branch whose head is `head`.
///
/// `resolution` is normalized, so branch aliases are accepted; callers that
/// must restrict the policy validate it first.
pub fn plan_merge<S: ObjectStore + ?Sized>(
    store: &S,
    head: Option<ObjectId>,
    incoming: ObjectId,
    resolution: ConflictResolution,
    signature: &MergeSignature,
) -> MergeResult<MergePlan> {
    let resolution = resolution.normalize();
    let incoming_commit = store
        .get_commit(&incoming)?
        .ok_or(MergeError::IncomingNotFound(incoming))?;

    let Some(head) = head else {
        debug!(incoming = %incoming.short_hex(), "merge into empty branch");
        return Ok(MergePlan::without_writes(MergeKind::Initialized, incoming));
    };
    if can_fast_forward(store, incoming, Some(head))? {
        debug!(head = %head.short_hex(), incoming = %incoming.short_hex(), "fast-forward merge");
        return Ok(MergePlan::without_writes(MergeKind::FastForward, incoming));
    }

    let head_commit = load_commit(store, head)?;
    let merged = auto_merge(incoming_commit.index(), head_commit.index(), resolution);
    if merged.has_conflicts() && resolution == ConflictResolution::Leave {
        debug!(conflicts = merged.conflicts.len(), "merge left unresolved");
        return Ok(MergePlan {
            outcome: MergeOutcome {
                kind: MergeKind::Unresolved,
                head,
                conflicts: merged.conflicts,
            },
            writes: Vec::new(),
        });
    }

    let mut writes = Vec::with_capacity(2);
    let reparented = match find_pre_intersection(store, Some(head), Some(incoming))? {
        Some(splice) => {
            let copy = load_commit(store, splice)?.with_parent(incoming);
            let id = copy.id();
            writes.push(copy);
            Some(id)
        }
        None => None,
    };

    let merge_commit = Commit::builder(signature.author.clone())
        .committer(signature.committer.clone())
        .parent(Some(head))
        .parent2(Some(incoming))
        .message(signature.message.clone())
        .index(merged.index)
        .build()?;
    let commit = merge_commit.id();
    writes.push(merge_commit);

    debug!(
        head = %head.short_hex(),
        incoming = %incoming.short_hex(),
        merge = %commit.short_hex(),
        reparented = ?reparented.map(|id| id.short_hex()),
        conflicts = merged.conflicts.len(),
        "merge commit planned"
    );
    Ok(MergePlan {
        outcome: MergeOutcome {
            kind: MergeKind::Merged { commit, reparented },
            head: commit,
            conflicts: merged.conflicts,
        },
        writes,
    })
}
