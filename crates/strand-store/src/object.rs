use serde::{Deserialize, Serialize};
use strand_crypto::ContentHasher;
use strand_types::ObjectId;

use crate::blob::Blob;
use crate::commit::Commit;
use crate::error::StoreResult;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Payload addressed by a commit index entry.
    Blob,
    /// Snapshot of a flat index with authorship and parent links.
    Commit,
}

impl ObjectKind {
    /// The domain-separated hasher for this kind.
    pub fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Blob => &ContentHasher::BLOB,
            Self::Commit => &ContentHasher::COMMIT,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// A stored object: kind tag + canonical encoding + cached size.
///
/// `StoredObject` is the unit of storage. Backends never interpret `data`;
/// they key it by [`StoredObject::compute_id`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The canonical encoding of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }
}

/// A decoded object of either kind, as returned by [`crate::ObjectStore::get`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Commit(Commit),
}

impl Object {
    /// Decode a stored object according to its kind tag.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        match obj.kind {
            ObjectKind::Blob => Blob::from_stored_object(obj).map(Self::Blob),
            ObjectKind::Commit => Commit::from_stored_object(obj).map(Self::Commit),
        }
    }

    pub fn to_stored_object(&self) -> StoredObject {
        match self {
            Self::Blob(blob) => blob.to_stored_object(),
            Self::Commit(commit) => commit.to_stored_object(),
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            Self::Blob(blob) => blob.id(),
            Self::Commit(commit) => commit.id(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_object_id_deterministic() {
        let obj = StoredObject::new(ObjectKind::Blob, b"deterministic".to_vec());
        assert_eq!(obj.compute_id(), obj.compute_id());
        assert_eq!(obj.size, 13);
    }

    #[test]
    fn different_kinds_produce_different_ids() {
        let data = b"same data".to_vec();
        let blob = StoredObject::new(ObjectKind::Blob, data.clone());
        let commit = StoredObject::new(ObjectKind::Commit, data);
        assert_ne!(blob.compute_id(), commit.compute_id());
    }

    #[test]
    fn object_dispatches_on_kind() {
        let blob = Blob::text("hello");
        let obj = Object::from_stored_object(&blob.to_stored_object()).unwrap();
        assert_eq!(obj.kind(), ObjectKind::Blob);
        assert_eq!(obj.id(), blob.id());
        assert_eq!(obj, Object::Blob(blob));
    }

    #[test]
    fn object_kind_display() {
        assert_eq!(format!("{}", ObjectKind::Blob), "blob");
        assert_eq!(format!("{}", ObjectKind::Commit), "commit");
    }
}
