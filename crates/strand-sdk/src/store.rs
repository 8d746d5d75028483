//! The store port: content-addressed objects plus the two ref tables.

use strand_refs::{BranchAndHead, InMemoryRefStore, RefKind, RefStore};
use strand_store::{InMemoryObjectStore, ObjectStore, StoreResult, StoredObject};
use strand_types::ObjectId;
use tracing::debug;

use crate::error::EngineResult;

/// Everything an [`Engine`](crate::Engine) persists.
///
/// Any type that is both an [`ObjectStore`] and a [`RefStore`] is a `Store`,
/// so persistence backends implement the two halves independently.
pub trait Store: ObjectStore + RefStore {
    /// Remove every object and ref.
    fn wipe(&self) -> EngineResult<()> {
        self.wipe_objects()?;
        self.wipe_refs()?;
        debug!("store wiped");
        Ok(())
    }
}

impl<T: ObjectStore + RefStore> Store for T {}

/// In-memory [`Store`] for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: InMemoryObjectStore,
    refs: InMemoryRefStore,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl ObjectStore for InMemoryStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        self.objects.read(id)
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        self.objects.write(object)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        self.objects.exists(id)
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        self.objects.delete(id)
    }

    fn wipe_objects(&self) -> StoreResult<()> {
        self.objects.wipe_objects()
    }
}

impl RefStore for InMemoryStore {
    fn get_ref(&self, kind: RefKind, branch: &str) -> strand_refs::Result<Option<ObjectId>> {
        self.refs.get_ref(kind, branch)
    }

    fn set_ref(
        &self,
        kind: RefKind,
        branch: &str,
        expected: Option<ObjectId>,
        new: ObjectId,
    ) -> strand_refs::Result<()> {
        self.refs.set_ref(kind, branch, expected, new)
    }

    fn list_refs(&self, kind: RefKind) -> strand_refs::Result<Vec<BranchAndHead>> {
        self.refs.list_refs(kind)
    }

    fn remove_ref(&self, kind: RefKind, branch: &str) -> strand_refs::Result<bool> {
        self.refs.remove_ref(kind, branch)
    }

    fn wipe_refs(&self) -> strand_refs::Result<()> {
        self.refs.wipe_refs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strand_store::Blob;

    #[test]
    fn wipe_clears_objects_and_refs() {
        let store = InMemoryStore::new();
        let id = store.put_blob(&Blob::text("x")).unwrap();
        store.set_ref(RefKind::Local, "main", None, id).unwrap();
        store.set_ref(RefKind::Remote, "main", None, id).unwrap();

        store.wipe().unwrap();
        assert_eq!(store.object_count(), 0);
        assert!(store.list_refs(RefKind::Local).unwrap().is_empty());
        assert!(store.list_refs(RefKind::Remote).unwrap().is_empty());
    }

    #[test]
    fn usable_as_trait_object() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let id = store.put_blob(&Blob::text("shared")).unwrap();
        assert_eq!(store.get_blob(&id).unwrap(), Some(Blob::text("shared")));
        store.wipe().unwrap();
        assert!(!store.exists(&id).unwrap());
    }
}
