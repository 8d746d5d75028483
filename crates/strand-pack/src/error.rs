use strand_types::ObjectId;

/// Errors from pack verification and application.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// An object is filed under an id its content does not hash to.
    #[error("pack object filed under {expected} hashes to {actual}")]
    IdMismatch { expected: ObjectId, actual: ObjectId },

    /// The pack's head commit is not in the pack.
    #[error("pack for {branch} does not contain its head {head}")]
    MissingHead { branch: String, head: ObjectId },

    /// A packed commit's parent is neither packed nor already stored.
    #[error("commit {commit} has parent {parent} outside the pack and the store")]
    MissingParent { commit: ObjectId, parent: ObjectId },

    /// A packed commit's blob is neither packed nor already stored.
    #[error("commit {commit} references blob {blob} ({name}) outside the pack and the store")]
    MissingBlob {
        commit: ObjectId,
        name: String,
        blob: ObjectId,
    },

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] strand_store::StoreError),
}

/// Result alias for pack operations.
pub type PackResult<T> = Result<T, PackError>;
