//! Error types for commit graph walks.

use strand_types::ObjectId;

/// Errors that can occur while walking the commit graph.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// A commit id reached during a walk does not resolve.
    #[error("commit not found: {0}")]
    MissingCommit(ObjectId),

    /// A blob referenced by a commit's index does not resolve.
    #[error("commit {commit} references missing blob {blob} for {name}")]
    MissingBlob {
        commit: ObjectId,
        name: String,
        blob: ObjectId,
    },

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] strand_store::StoreError),
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
