//! The staging state machine.
//!
//! Invariant: `index()` always equals the committed index overlaid with
//! `added` and `modified`, minus `removed`, and a name appears in at most one
//! of the three pending sets.

use std::collections::{BTreeMap, BTreeSet};

use strand_store::{Blob, BlobContent, Commit, Index};
use strand_types::ObjectId;
use tracing::trace;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::status::Status;

/// Mutable staging area layered over a checked-out commit.
///
/// All mutation goes through `&mut self`, so a workspace has a single owner at
/// a time. Share one across threads by wrapping it in a lock.
#[derive(Clone, Default)]
pub struct Workspace {
    commit: Option<ObjectId>,
    committed: Index,
    contents: BTreeMap<String, Blob>,
    added: BTreeMap<String, Blob>,
    modified: BTreeMap<String, Blob>,
    removed: BTreeSet<String>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("commit", &self.commit)
            .field("committed", &self.committed.len())
            .field("added", &self.added.keys().collect::<Vec<_>>())
            .field("modified", &self.modified.keys().collect::<Vec<_>>())
            .field("removed", &self.removed)
            .finish()
    }
}

impl Workspace {
    /// An unbound, empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// The commit this workspace is bound to.
    pub fn commit(&self) -> Option<ObjectId> {
        self.commit
    }

    /// The index of the bound commit, without pending changes.
    pub fn committed_index(&self) -> &Index {
        &self.committed
    }

    /// Stage `content` under `name`.
    ///
    /// Staging content identical to the committed blob drops any pending
    /// change for the name.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<BlobContent>) -> WorkspaceResult<()> {
        let name = name.into();
        if name.is_empty() || name.contains('\0') {
            return Err(WorkspaceError::InvalidName(name));
        }
        let blob = Blob::new(content);
        self.removed.remove(&name);
        match self.committed.get(&name) {
            None => {
                trace!(name = %name, blob = %blob.id().short_hex(), "staged addition");
                self.added.insert(name, blob);
            }
            Some(id) if *id != blob.id() => {
                trace!(name = %name, blob = %blob.id().short_hex(), "staged modification");
                self.modified.insert(name, blob);
            }
            Some(_) => {
                self.modified.remove(&name);
            }
        }
        Ok(())
    }

    /// Stage the removal of `name`. Unknown names are ignored.
    pub fn remove(&mut self, name: &str) {
        if self.added.remove(name).is_some() {
            return;
        }
        if self.modified.remove(name).is_some() || self.committed.contains_key(name) {
            trace!(name, "staged removal");
            self.removed.insert(name.to_string());
        }
    }

    /// Effective content of `name`, pending changes first.
    pub fn get(&self, name: &str) -> Option<&BlobContent> {
        self.get_blob(name).map(Blob::content)
    }

    /// Effective blob of `name`, pending changes first.
    pub fn get_blob(&self, name: &str) -> Option<&Blob> {
        if self.removed.contains(name) {
            return None;
        }
        self.added
            .get(name)
            .or_else(|| self.modified.get(name))
            .or_else(|| self.contents.get(name))
    }

    /// Every effective name, sorted.
    pub fn list(&self) -> Vec<String> {
        self.committed
            .keys()
            .chain(self.added.keys())
            .filter(|name| !self.removed.contains(*name))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Effective name-to-blob mapping.
    pub fn index(&self) -> Index {
        let mut index = self.committed.clone();
        for (name, blob) in self.added.iter().chain(&self.modified) {
            index.insert(name.clone(), blob.id());
        }
        for name in &self.removed {
            index.remove(name);
        }
        index
    }

    /// Names of pending changes.
    pub fn status(&self) -> Status {
        Status {
            added: self.added.keys().cloned().collect(),
            modified: self.modified.keys().cloned().collect(),
            removed: self.removed.clone(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Pending additions and modifications with their blobs.
    pub fn pending_blobs(&self) -> impl Iterator<Item = (&str, &Blob)> {
        self.added
            .iter()
            .chain(&self.modified)
            .map(|(name, blob)| (name.as_str(), blob))
    }

    /// Names pending removal.
    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    /// Rebind to a commit just built from this workspace.
    ///
    /// Pending blobs become committed contents; names outside the new index
    /// are dropped.
    pub fn commit_transition(&mut self, commit: &Commit) {
        let mut contents = std::mem::take(&mut self.contents);
        contents.append(&mut self.added);
        contents.append(&mut self.modified);
        contents.retain(|name, blob| commit.index().get(name) == Some(&blob.id()));

        self.contents = contents;
        self.committed = commit.index().clone();
        self.commit = Some(commit.id());
        self.removed.clear();
        trace!(commit = %commit.id().short_hex(), "workspace committed");
    }

    /// Rebind to `commit` with contents resolved by the caller.
    ///
    /// `contents` must hold exactly the names of the commit's index, each
    /// hashing to the indexed blob id. On error the workspace is unchanged.
    pub fn checkout_transition(
        &mut self,
        commit: &Commit,
        contents: BTreeMap<String, Blob>,
    ) -> WorkspaceResult<()> {
        for (name, expected) in commit.index() {
            match contents.get(name) {
                None => {
                    return Err(WorkspaceError::MissingContent {
                        commit: commit.id(),
                        name: name.clone(),
                    })
                }
                Some(blob) if blob.id() != *expected => {
                    return Err(WorkspaceError::ContentMismatch {
                        name: name.clone(),
                        expected: *expected,
                    })
                }
                Some(_) => {}
            }
        }
        if let Some(name) = contents.keys().find(|name| !commit.index().contains_key(*name)) {
            return Err(WorkspaceError::UnexpectedContent {
                commit: commit.id(),
                name: name.clone(),
            });
        }

        self.commit = Some(commit.id());
        self.committed = commit.index().clone();
        self.contents = contents;
        self.stash();
        trace!(commit = %commit.id().short_hex(), "workspace checked out");
        Ok(())
    }

    /// Discard pending changes, keeping the binding.
    pub fn stash(&mut self) {
        self.added.clear();
        self.modified.clear();
        self.removed.clear();
    }

    /// Unbind and discard everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_of(entries: &[(&str, &str)]) -> (Commit, BTreeMap<String, Blob>) {
        let mut builder = Commit::builder("tester").message("base");
        let mut contents = BTreeMap::new();
        for (name, text) in entries {
            let blob = Blob::text(*text);
            builder = builder.entry(*name, blob.id());
            contents.insert(name.to_string(), blob);
        }
        (builder.build().unwrap(), contents)
    }

    fn checked_out(entries: &[(&str, &str)]) -> Workspace {
        let (commit, contents) = commit_of(entries);
        let mut ws = Workspace::new();
        ws.checkout_transition(&commit, contents).unwrap();
        ws
    }

    fn text(ws: &Workspace, name: &str) -> Option<String> {
        match ws.get(name) {
            Some(BlobContent::Text(t)) => Some(t.clone()),
            _ => None,
        }
    }

    // ---- add ----

    #[test]
    fn add_new_name_is_added() {
        let mut ws = Workspace::new();
        ws.add("a", "X").unwrap();
        assert_eq!(ws.status().added, BTreeSet::from(["a".to_string()]));
        assert_eq!(text(&ws, "a").as_deref(), Some("X"));
    }

    #[test]
    fn add_changed_content_is_modified() {
        let mut ws = checked_out(&[("a", "X")]);
        ws.add("a", "Y").unwrap();
        let status = ws.status();
        assert!(status.added.is_empty());
        assert!(status.modified.contains("a"));
        assert_eq!(text(&ws, "a").as_deref(), Some("Y"));
    }

    #[test]
    fn add_committed_content_is_noop() {
        let mut ws = checked_out(&[("a", "X")]);
        ws.add("a", "X").unwrap();
        assert!(ws.is_clean());
    }

    #[test]
    fn add_back_committed_content_reverts_modification() {
        let mut ws = checked_out(&[("a", "X")]);
        ws.add("a", "Y").unwrap();
        ws.add("a", "X").unwrap();
        assert!(ws.is_clean());
        assert_eq!(ws.index(), *ws.committed_index());
    }

    #[test]
    fn add_after_remove_unremoves() {
        let mut ws = checked_out(&[("a", "X")]);
        ws.remove("a");
        ws.add("a", "Z").unwrap();
        let status = ws.status();
        assert!(status.removed.is_empty());
        assert!(status.modified.contains("a"));
    }

    #[test]
    fn add_rejects_bad_names() {
        let mut ws = Workspace::new();
        assert!(matches!(ws.add("", "x"), Err(WorkspaceError::InvalidName(_))));
        assert!(ws.add("a\0b", "x").is_err());
    }

    // ---- remove ----

    #[test]
    fn remove_added_drops_entirely() {
        let mut ws = Workspace::new();
        ws.add("a", "X").unwrap();
        ws.remove("a");
        assert!(ws.is_clean());
        assert!(ws.get("a").is_none());
    }

    #[test]
    fn remove_modified_moves_to_removed() {
        let mut ws = checked_out(&[("a", "X")]);
        ws.add("a", "Y").unwrap();
        ws.remove("a");
        let status = ws.status();
        assert!(status.modified.is_empty());
        assert!(status.removed.contains("a"));
        assert!(ws.get("a").is_none());
    }

    #[test]
    fn remove_committed_marks_removed() {
        let mut ws = checked_out(&[("a", "X"), ("b", "Y")]);
        ws.remove("a");
        assert_eq!(ws.list(), vec!["b".to_string()]);
        assert!(!ws.index().contains_key("a"));
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut ws = checked_out(&[("a", "X")]);
        ws.remove("ghost");
        assert!(ws.is_clean());
    }

    // ---- views ----

    #[test]
    fn list_and_index_combine_all_layers() {
        let mut ws = checked_out(&[("a", "1"), ("b", "2"), ("c", "3")]);
        ws.add("d", "4").unwrap();
        ws.add("b", "two").unwrap();
        ws.remove("c");
        assert_eq!(ws.list(), vec!["a", "b", "d"]);
        let index = ws.index();
        assert_eq!(index.len(), 3);
        assert_eq!(index["b"], Blob::text("two").id());
        assert_eq!(index["d"], Blob::text("4").id());
    }

    #[test]
    fn pending_sets_stay_disjoint() {
        let mut ws = checked_out(&[("a", "X")]);
        ws.add("a", "Y").unwrap();
        ws.remove("a");
        ws.add("a", "Z").unwrap();
        ws.add("n", "new").unwrap();
        let status = ws.status();
        assert!(status.added.is_disjoint(&status.modified));
        assert!(status.added.is_disjoint(&status.removed));
        assert!(status.modified.is_disjoint(&status.removed));
        assert_eq!(status.len(), 2);
    }

    // ---- transitions ----

    #[test]
    fn commit_transition_rebinds_and_clears() {
        let mut ws = checked_out(&[("a", "X"), ("b", "Y")]);
        ws.add("a", "X2").unwrap();
        ws.add("c", "Z").unwrap();
        ws.remove("b");
        let next = Commit::builder("tester")
            .parent(ws.commit())
            .index(ws.index())
            .build()
            .unwrap();
        ws.commit_transition(&next);
        assert_eq!(ws.commit(), Some(next.id()));
        assert!(ws.is_clean());
        assert_eq!(ws.list(), vec!["a", "c"]);
        assert_eq!(text(&ws, "a").as_deref(), Some("X2"));
        assert!(ws.get("b").is_none());
    }

    #[test]
    fn checkout_transition_validates_contents() {
        let (commit, mut contents) = commit_of(&[("a", "X")]);
        let mut ws = Workspace::new();
        contents.insert("a".into(), Blob::text("wrong"));
        assert!(matches!(
            ws.checkout_transition(&commit, contents),
            Err(WorkspaceError::ContentMismatch { .. })
        ));
        assert!(ws.commit().is_none());

        let (commit, _) = commit_of(&[("a", "X")]);
        assert!(matches!(
            ws.checkout_transition(&commit, BTreeMap::new()),
            Err(WorkspaceError::MissingContent { .. })
        ));

        let (commit, mut contents) = commit_of(&[("a", "X")]);
        contents.insert("extra".into(), Blob::text("?"));
        assert!(matches!(
            ws.checkout_transition(&commit, contents),
            Err(WorkspaceError::UnexpectedContent { .. })
        ));
    }

    #[test]
    fn checkout_discards_pending_changes() {
        let mut ws = checked_out(&[("a", "X")]);
        ws.add("b", "pending").unwrap();
        let (other, contents) = commit_of(&[("z", "Q")]);
        ws.checkout_transition(&other, contents).unwrap();
        assert!(ws.is_clean());
        assert_eq!(ws.list(), vec!["z"]);
    }

    #[test]
    fn stash_keeps_binding() {
        let mut ws = checked_out(&[("a", "X")]);
        let bound = ws.commit();
        ws.add("b", "Y").unwrap();
        ws.stash();
        assert!(ws.is_clean());
        assert_eq!(ws.commit(), bound);
        assert_eq!(text(&ws, "a").as_deref(), Some("X"));
    }

    #[test]
    fn reset_unbinds() {
        let mut ws = checked_out(&[("a", "X")]);
        ws.add("b", "Y").unwrap();
        ws.reset();
        assert!(ws.commit().is_none());
        assert!(ws.list().is_empty());
        assert!(ws.get("a").is_none());
    }
}
