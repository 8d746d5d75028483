//! Error types for the workspace crate.

use strand_types::ObjectId;

/// Errors that can occur during workspace operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// The name cannot appear in a commit index.
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// Checkout contents are missing a name of the commit's index.
    #[error("checkout of {commit} is missing content for {name}")]
    MissingContent { commit: ObjectId, name: String },

    /// Checkout contents do not hash to the blob id in the commit's index.
    #[error("content for {name} does not match blob {expected}")]
    ContentMismatch { name: String, expected: ObjectId },

    /// Checkout contents carry a name the commit's index does not have.
    #[error("checkout of {commit} has unexpected content for {name}")]
    UnexpectedContent { commit: ObjectId, name: String },
}

/// Convenience alias for workspace results.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
