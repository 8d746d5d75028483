//! The serving side of fetch and push, shared by every transport.
//!
//! On the serving repository a branch is a [`RefKind::Local`] ref.

use strand_dag::{can_fast_forward, collect_objects, DagError, ObjectSet};
use strand_pack::{PackStats, UploadPack};
use strand_refs::{BranchAndHead, RefError, RefKind, RefStore};
use strand_store::ObjectStore;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

/// Build one pack per requested branch that has history beyond the
/// advertised head.
///
/// Empty branches, branches already at the advertised head, and branches
/// whose head does not descend from it are left out.
pub fn serve_fetch<O, R>(
    objects: &O,
    refs: &R,
    branches: &[BranchAndHead],
) -> SyncResult<Vec<UploadPack>>
where
    O: ObjectStore + ?Sized,
    R: RefStore + ?Sized,
{
    let mut packs = Vec::new();
    for BranchAndHead { branch, head: known } in branches {
        let Some(head) = refs.get_ref(RefKind::Local, branch)? else {
            debug!(branch = %branch, "fetch: branch empty on remote");
            continue;
        };
        if Some(head) == *known {
            debug!(branch = %branch, "fetch: up to date");
            continue;
        }
        let mut set = ObjectSet::new();
        if !collect_objects(objects, head, *known, &mut set)? {
            warn!(
                branch = %branch,
                head = %head.short_hex(),
                known = ?known.map(|id| id.short_hex()),
                "fetch: advertised head is not an ancestor, skipping"
            );
            continue;
        }
        debug!(branch = %branch, head = %head.short_hex(), objects = set.len(), "fetch: packed");
        packs.push(UploadPack::new(branch.clone(), head, set));
    }
    Ok(packs)
}

/// Store a pushed pack and move its branch to the pack head.
///
/// The pack must extend the branch's current head; anything else is a
/// conflict and leaves both stores untouched.
pub fn receive_push<O, R>(objects: &O, refs: &R, pack: &UploadPack) -> SyncResult<PackStats>
where
    O: ObjectStore + ?Sized,
    R: RefStore + ?Sized,
{
    pack.verify()?;
    let branch = pack.branch.as_str();
    let current = refs.get_ref(RefKind::Local, branch)?;
    match current {
        Some(current) if current == pack.head => {
            debug!(branch, "push: already up to date");
            return Ok(PackStats::default());
        }
        Some(current) => match can_fast_forward(pack, pack.head, Some(current)) {
            Ok(true) => {}
            Ok(false) | Err(DagError::MissingCommit(_)) => {
                warn!(
                    branch,
                    head = %pack.head.short_hex(),
                    current = %current.short_hex(),
                    "push: rejected, not a fast-forward"
                );
                return Err(SyncError::Conflict(format!(
                    "non fast-forward push to '{branch}'"
                )));
            }
            Err(e) => return Err(e.into()),
        },
        None => {}
    }

    let stats = pack.apply(objects)?;
    refs.set_ref(RefKind::Local, branch, current, pack.head)
        .map_err(|e| match e {
            RefError::Conflict { .. } => {
                SyncError::Conflict(format!("branch '{branch}' moved during push"))
            }
            other => other.into(),
        })?;
    debug!(
        branch,
        head = %pack.head.short_hex(),
        commits = stats.commits,
        blobs = stats.blobs,
        "push: branch updated"
    );
    Ok(stats)
}
