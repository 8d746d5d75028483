use strand_types::ObjectId;

use crate::blob::Blob;
use crate::commit::Commit;
use crate::error::{StoreError, StoreResult};
use crate::object::{Object, ObjectKind, StoredObject};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same data always produces the
///   same ID.
/// - `write` is idempotent: storing an object that already exists is a no-op,
///   so concurrent writers of the same object never conflict.
/// - Concurrent reads are always safe.
/// - All backend errors are propagated, never silently ignored.
///
/// Backends implement the raw methods; the typed helpers (`put_blob`,
/// `get_commit`, ...) are provided on top of them.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Delete an object by ID. Returns `true` if the object existed.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Remove every object.
    fn wipe_objects(&self) -> StoreResult<()>;

    /// Write multiple objects and return their IDs.
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }

    fn put_blob(&self, blob: &Blob) -> StoreResult<ObjectId> {
        self.write(&blob.to_stored_object())
    }

    fn put_commit(&self, commit: &Commit) -> StoreResult<ObjectId> {
        self.write(&commit.to_stored_object())
    }

    /// Read and decode an object of either kind.
    ///
    /// The decoded object's id is re-derived and must equal `id`.
    fn get(&self, id: &ObjectId) -> StoreResult<Option<Object>> {
        let Some(stored) = self.read(id)? else {
            return Ok(None);
        };
        let object = Object::from_stored_object(&stored)?;
        if object.id() != *id {
            return Err(StoreError::HashMismatch {
                id: *id,
                computed: object.id(),
            });
        }
        Ok(Some(object))
    }

    /// Read a blob. An object of another kind under `id` is an error.
    fn get_blob(&self, id: &ObjectId) -> StoreResult<Option<Blob>> {
        match self.get(id)? {
            None => Ok(None),
            Some(Object::Blob(blob)) => Ok(Some(blob)),
            Some(other) => Err(StoreError::KindMismatch {
                id: *id,
                expected: ObjectKind::Blob,
                actual: other.kind(),
            }),
        }
    }

    /// Read a commit. An object of another kind under `id` is an error.
    fn get_commit(&self, id: &ObjectId) -> StoreResult<Option<Commit>> {
        match self.get(id)? {
            None => Ok(None),
            Some(Object::Commit(commit)) => Ok(Some(commit)),
            Some(other) => Err(StoreError::KindMismatch {
                id: *id,
                expected: ObjectKind::Commit,
                actual: other.kind(),
            }),
        }
    }
}
