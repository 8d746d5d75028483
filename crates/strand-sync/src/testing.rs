//! A repository fixture implementing both store ports.

use strand_dag::{collect_objects, ObjectSet};
use strand_pack::UploadPack;
use strand_refs::{BranchAndHead, InMemoryRefStore, RefKind, RefStore};
use strand_store::{Blob, Commit, InMemoryObjectStore, ObjectStore, StoreResult, StoredObject};
use strand_types::ObjectId;

#[derive(Debug, Default)]
pub struct Repo {
    pub objects: InMemoryObjectStore,
    pub refs: InMemoryRefStore,
}

impl Repo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&self, parent: Option<ObjectId>, text: &str) -> ObjectId {
        let blob = Blob::text(text);
        self.objects.put_blob(&blob).unwrap();
        let commit = Commit::builder("tester")
            .parent(parent)
            .message(text)
            .entry("file", blob.id())
            .build()
            .unwrap();
        self.objects.put_commit(&commit).unwrap()
    }

    pub fn set_head(&self, branch: &str, head: ObjectId) {
        let old = self.refs.get_ref(RefKind::Local, branch).unwrap();
        self.refs.set_ref(RefKind::Local, branch, old, head).unwrap();
    }

    pub fn head(&self, branch: &str) -> Option<ObjectId> {
        self.refs.get_ref(RefKind::Local, branch).unwrap()
    }

    pub fn pack(&self, branch: &str, head: ObjectId, since: Option<ObjectId>) -> UploadPack {
        let mut set = ObjectSet::new();
        collect_objects(&self.objects, head, since, &mut set).unwrap();
        UploadPack::new(branch, head, set)
    }
}

impl ObjectStore for Repo {
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

impl RefStore for Repo {
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
