//! Error types for merge operations.

use strand_types::ObjectId;

/// Errors that can occur while planning a merge.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The resolution policy is unknown or not allowed for this kind of merge.
    #[error("invalid conflict resolution: {0}")]
    InvalidResolution(String),

    /// The commit to merge does not exist.
    #[error("incoming commit not found: {0}")]
    IncomingNotFound(ObjectId),

    /// A walk of the commit graph failed.
    #[error("graph error: {0}")]
    Dag(#[from] strand_dag::DagError),

    /// Store operation failed, including building an unrepresentable commit.
    #[error("store error: {0}")]
    Store(#[from] strand_store::StoreError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
