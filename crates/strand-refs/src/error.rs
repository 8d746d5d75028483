//! Error types for reference operations.

use strand_types::ObjectId;
use thiserror::Error;

use crate::types::RefKind;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The branch has no head.
    #[error("{kind} branch not found: {branch}")]
    NotFound { kind: RefKind, branch: String },

    /// Compare-and-swap failed: the branch moved since the caller read it.
    #[error(
        "{kind} branch {branch} moved: expected {}, found {}",
        display_head(.expected),
        display_head(.actual)
    )]
    Conflict {
        kind: RefKind,
        branch: String,
        expected: Option<ObjectId>,
        actual: Option<ObjectId>,
    },

    /// The branch name is invalid.
    #[error("invalid branch name: {name}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// Failure inside the storage backend.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;

fn display_head(head: &Option<ObjectId>) -> String {
    match head {
        Some(id) => id.short_hex(),
        None => "(empty)".to_string(),
    }
}
