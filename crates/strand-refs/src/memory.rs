//! In-memory reference store for testing and embedding.
//!
//! [`InMemoryRefStore`] keeps each ref table in a `BTreeMap` behind its own
//! `RwLock`. A compare-and-swap holds the table's write lock across the
//! comparison and the update.

use std::collections::BTreeMap;
use std::sync::RwLock;

use strand_types::ObjectId;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_branch_name;
use crate::traits::RefStore;
use crate::types::{BranchAndHead, RefKind};

type RefTable = RwLock<BTreeMap<String, ObjectId>>;

/// An in-memory implementation of [`RefStore`].
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    local: RefTable,
    remote: RefTable,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: RefKind) -> &RefTable {
        match kind {
            RefKind::Local => &self.local,
            RefKind::Remote => &self.remote,
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> RefError {
    RefError::Backend(format!("lock poisoned: {e}"))
}

impl RefStore for InMemoryRefStore {
    fn get_ref(&self, kind: RefKind, branch: &str) -> Result<Option<ObjectId>> {
        let table = self.table(kind).read().map_err(poisoned)?;
        Ok(table.get(branch).copied())
    }

    fn set_ref(
        &self,
        kind: RefKind,
        branch: &str,
        expected: Option<ObjectId>,
        new: ObjectId,
    ) -> Result<()> {
        validate_branch_name(branch)?;
        let mut table = self.table(kind).write().map_err(poisoned)?;
        let actual = table.get(branch).copied();
        if actual != expected {
            return Err(RefError::Conflict {
                kind,
                branch: branch.to_string(),
                expected,
                actual,
            });
        }
        table.insert(branch.to_string(), new);
        debug!(%kind, branch, head = %new.short_hex(), "ref updated");
        Ok(())
    }

    fn list_refs(&self, kind: RefKind) -> Result<Vec<BranchAndHead>> {
        let table = self.table(kind).read().map_err(poisoned)?;
        Ok(table
            .iter()
            .map(|(branch, head)| BranchAndHead::new(branch.clone(), Some(*head)))
            .collect())
    }

    fn remove_ref(&self, kind: RefKind, branch: &str) -> Result<bool> {
        let mut table = self.table(kind).write().map_err(poisoned)?;
        let removed = table.remove(branch).is_some();
        if removed {
            debug!(%kind, branch, "ref removed");
        }
        Ok(removed)
    }

    fn wipe_refs(&self) -> Result<()> {
        self.local.write().map_err(poisoned)?.clear();
        self.remote.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn id(n: u8) -> ObjectId {
        ObjectId::from_hash([n; 32])
    }

    // ---- Test 1: Create and read a branch ----
    #[test]
    fn create_and_read_branch() {
        let store = InMemoryRefStore::new();
        store.set_ref(RefKind::Local, "main", None, id(1)).unwrap();
        assert_eq!(store.get_ref(RefKind::Local, "main").unwrap(), Some(id(1)));
    }

    // ---- Test 2: Missing branch reads as empty ----
    #[test]
    fn missing_branch_is_none() {
        let store = InMemoryRefStore::new();
        assert!(store.get_ref(RefKind::Local, "nope").unwrap().is_none());
        let err = store.require_ref(RefKind::Local, "nope").unwrap_err();
        assert!(matches!(err, RefError::NotFound { .. }));
        assert!(store
            .branch_and_head(RefKind::Local, "nope")
            .unwrap()
            .is_empty());
    }

    // ---- Test 3: Advance with the correct expectation ----
    #[test]
    fn advance_with_expected_head() {
        let store = InMemoryRefStore::new();
        store.set_ref(RefKind::Local, "main", None, id(1)).unwrap();
        store
            .set_ref(RefKind::Local, "main", Some(id(1)), id(2))
            .unwrap();
        assert_eq!(store.get_ref(RefKind::Local, "main").unwrap(), Some(id(2)));
    }

    // ---- Test 4: Stale expectation is a conflict and leaves the ref alone ----
    #[test]
    fn stale_expectation_conflicts() {
        let store = InMemoryRefStore::new();
        store.set_ref(RefKind::Local, "main", None, id(1)).unwrap();
        let err = store
            .set_ref(RefKind::Local, "main", Some(id(9)), id(2))
            .unwrap_err();
        match err {
            RefError::Conflict {
                expected, actual, ..
            } => {
                assert_eq!(expected, Some(id(9)));
                assert_eq!(actual, Some(id(1)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.get_ref(RefKind::Local, "main").unwrap(), Some(id(1)));
    }

    // ---- Test 5: Creating over an existing branch is a conflict ----
    #[test]
    fn create_over_existing_conflicts() {
        let store = InMemoryRefStore::new();
        store.set_ref(RefKind::Local, "main", None, id(1)).unwrap();
        assert!(store.set_ref(RefKind::Local, "main", None, id(2)).is_err());
    }

    // ---- Test 6: Local and remote tables are independent ----
    #[test]
    fn tables_are_independent() {
        let store = InMemoryRefStore::new();
        store.set_ref(RefKind::Local, "main", None, id(1)).unwrap();
        store.set_ref(RefKind::Remote, "main", None, id(2)).unwrap();
        assert_eq!(store.get_ref(RefKind::Local, "main").unwrap(), Some(id(1)));
        assert_eq!(store.get_ref(RefKind::Remote, "main").unwrap(), Some(id(2)));
    }

    // ---- Test 7: List is sorted by name ----
    #[test]
    fn list_sorted() {
        let store = InMemoryRefStore::new();
        for (name, n) in [("zeta", 1), ("alpha", 2), ("mid/x", 3)] {
            store.set_ref(RefKind::Local, name, None, id(n)).unwrap();
        }
        let names: Vec<String> = store
            .list_refs(RefKind::Local)
            .unwrap()
            .into_iter()
            .map(|b| b.branch)
            .collect();
        assert_eq!(names, ["alpha", "mid/x", "zeta"]);
        assert!(store.list_refs(RefKind::Remote).unwrap().is_empty());
    }

    // ---- Test 8: Remove and wipe ----
    #[test]
    fn remove_and_wipe() {
        let store = InMemoryRefStore::new();
        store.set_ref(RefKind::Local, "a", None, id(1)).unwrap();
        store.set_ref(RefKind::Remote, "b", None, id(2)).unwrap();
        assert!(store.remove_ref(RefKind::Local, "a").unwrap());
        assert!(!store.remove_ref(RefKind::Local, "a").unwrap());
        store.wipe_refs().unwrap();
        assert!(store.list_refs(RefKind::Remote).unwrap().is_empty());
    }

    // ---- Test 9: Invalid names are rejected ----
    #[test]
    fn invalid_name_rejected() {
        let store = InMemoryRefStore::new();
        let err = store.set_ref(RefKind::Local, "bad name", None, id(1));
        assert!(matches!(err, Err(RefError::InvalidBranchName { .. })));
    }

    // ---- Test 10: Exactly one racing writer wins ----
    #[test]
    fn concurrent_cas_has_single_winner() {
        let store = Arc::new(InMemoryRefStore::new());
        store.set_ref(RefKind::Local, "main", None, id(0)).unwrap();
        let handles: Vec<_> = (1..=8u8)
            .map(|n| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .set_ref(RefKind::Local, "main", Some(id(0)), id(n))
                        .is_ok()
                })
            })
            .collect();
        let wins = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert_ne!(store.get_ref(RefKind::Local, "main").unwrap(), Some(id(0)));
    }
}
