//! Read-only [`ObjectStore`] view over a pack's contents.

use strand_store::{ObjectStore, StoreError, StoreResult, StoredObject};
use strand_types::ObjectId;

use crate::pack::UploadPack;

impl ObjectStore for UploadPack {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        if let Some(commit) = self.commits.get(id) {
            return Ok(Some(commit.to_stored_object()));
        }
        Ok(self.blobs.get(id).map(|blob| blob.to_stored_object()))
    }

    fn write(&self, _object: &StoredObject) -> StoreResult<ObjectId> {
        Err(StoreError::ReadOnly)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.commits.contains_key(id) || self.blobs.contains_key(id))
    }

    fn delete(&self, _id: &ObjectId) -> StoreResult<bool> {
        Err(StoreError::ReadOnly)
    }

    fn wipe_objects(&self) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }
}
