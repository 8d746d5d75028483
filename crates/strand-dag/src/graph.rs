//! Fast-forward test, object collection and pre-intersection search.

use std::collections::{HashMap, HashSet};

use strand_store::ObjectStore;
use strand_types::ObjectId;
use tracing::debug;

use crate::ancestry::load_commit;
use crate::error::{DagError, DagResult};
use crate::objects::ObjectSet;

/// Returns `true` if moving a branch from `to` to `from` is a fast-forward.
///
/// Walks first parents from `from` until it reaches `to` or a root. An empty
/// `to` is always fast-forwardable.
pub fn can_fast_forward<S: ObjectStore + ?Sized>(
    store: &S,
    from: ObjectId,
    to: Option<ObjectId>,
) -> DagResult<bool> {
    let mut current = Some(from);
    while let Some(id) = current {
        if Some(id) == to {
            return Ok(true);
        }
        current = load_commit(store, id)?.parent();
    }
    Ok(to.is_none())
}

/// Walk from `from` towards `to`, harvesting every visited commit and the
/// blobs its index references into `out`.
///
/// `to` itself is not collected. Returns the same answer as
/// [`can_fast_forward`]; when that answer is `false` the harvested set is the
/// whole first-parent history of `from` and should not be shipped.
pub fn collect_objects<S: ObjectStore + ?Sized>(
    store: &S,
    from: ObjectId,
    to: Option<ObjectId>,
    out: &mut ObjectSet,
) -> DagResult<bool> {
    let mut current = Some(from);
    while let Some(id) = current {
        if Some(id) == to {
            debug!(from = %from.short_hex(), objects = out.len(), "collected objects");
            return Ok(true);
        }
        let commit = load_commit(store, id)?;
        if out.collects_blobs() {
            for (name, blob_id) in commit.index() {
                if out.blobs.contains_key(blob_id) {
                    continue;
                }
                let blob = store
                    .get_blob(blob_id)?
                    .ok_or_else(|| DagError::MissingBlob {
                        commit: id,
                        name: name.clone(),
                        blob: *blob_id,
                    })?;
                out.blobs.insert(*blob_id, blob);
            }
        }
        current = commit.parent();
        if out.collects_commits() {
            out.commits.insert(id, commit);
        }
    }
    Ok(to.is_none())
}

/// Find the commit on `a`'s path just past the point where it meets `b`'s.
///
/// Both paths are walked in lockstep, one first-parent hop per round. The
/// walk stops when the two cursors meet, when either cursor lands on a
/// commit the other path has already visited, or when both run off a root.
/// The answer is the commit on path `a` whose parent is that meeting point;
/// when the paths never meet it is `a`'s root. `a == b` yields `None`, as
/// does a meeting point that path `a` never stepped onto.
pub fn find_pre_intersection<S: ObjectStore + ?Sized>(
    store: &S,
    a: Option<ObjectId>,
    b: Option<ObjectId>,
) -> DagResult<Option<ObjectId>> {
    let (mut id_a, mut id_b) = (a, b);
    let mut seen_a: HashSet<ObjectId> = HashSet::new();
    let mut seen_b: HashSet<ObjectId> = HashSet::new();
    // parent (or None for a root) -> the child on path A that led to it
    let mut prev_a: HashMap<Option<ObjectId>, ObjectId> = HashMap::new();

    while id_a.is_some() || id_b.is_some() {
        if id_a.is_some() && id_a == id_b {
            break;
        }
        if let Some(current) = id_a {
            if seen_b.contains(&current) {
                break;
            }
            let parent = load_commit(store, current)?.parent();
            seen_a.insert(current);
            prev_a.insert(parent, current);
            id_a = parent;
        }
        if let Some(current) = id_b {
            if seen_a.contains(&current) {
                break;
            }
            let parent = load_commit(store, current)?.parent();
            seen_b.insert(current);
            id_b = parent;
        }
    }

    let found = if id_a.is_some() && id_a == id_b {
        prev_a.get(&id_a)
    } else if id_b.is_some_and(|id| seen_a.contains(&id)) {
        prev_a.get(&id_b)
    } else if id_a.is_some_and(|id| seen_b.contains(&id)) {
        prev_a.get(&id_a)
    } else if id_a.is_none() && id_b.is_none() {
        prev_a.get(&None)
    } else {
        None
    };
    debug!(
        a = ?a.map(|id| id.short_hex()),
        b = ?b.map(|id| id.short_hex()),
        found = ?found.map(|id| id.short_hex()),
        "pre-intersection search"
    );
    Ok(found.copied())
}
