//! First-parent history.

use strand_store::{Commit, ObjectStore};
use strand_types::ObjectId;

use crate::error::{DagError, DagResult};

/// Load a commit, treating absence as [`DagError::MissingCommit`].
pub fn load_commit<S: ObjectStore + ?Sized>(store: &S, id: ObjectId) -> DagResult<Commit> {
    store
        .get_commit(&id)?
        .ok_or(DagError::MissingCommit(id))
}

/// Iterator over a commit and its first-parent ancestors, newest first.
///
/// Yields an error and stops if a commit on the path is missing.
pub struct Ancestry<'a, S: ?Sized> {
    store: &'a S,
    next: Option<ObjectId>,
}

impl<'a, S: ObjectStore + ?Sized> Ancestry<'a, S> {
    pub fn new(store: &'a S, head: Option<ObjectId>) -> Self {
        Self { store, next: head }
    }
}

impl<S: ObjectStore + ?Sized> Iterator for Ancestry<'_, S> {
    type Item = DagResult<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match load_commit(self.store, id) {
            Ok(commit) => {
                self.next = commit.parent();
                Some(Ok(commit))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
