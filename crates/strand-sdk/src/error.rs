use strand_dag::DagError;
use strand_index::WorkspaceError;
use strand_merge::MergeError;
use strand_pack::PackError;
use strand_refs::RefError;
use strand_store::StoreError;
use strand_sync::SyncError;
use strand_types::TypeError;
use thiserror::Error;

/// Errors surfaced by [`Engine`](crate::Engine) operations.
///
/// Lower-level errors are reclassified on the way up: a ref compare-and-swap
/// mismatch is a [`Conflict`](Self::Conflict), an unresolvable parent or blob
/// met during a graph walk is [`Corrupt`](Self::Corrupt). Failures with no
/// better category keep their source error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("store is inconsistent: {0}")]
    Corrupt(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[source] StoreError),

    #[error("ref error: {0}")]
    Ref(#[source] RefError),

    #[error("transport error: {0}")]
    Transport(#[source] SyncError),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidObject(reason) => Self::InvalidArgument(reason),
            StoreError::HashMismatch { .. }
            | StoreError::CorruptObject { .. }
            | StoreError::KindMismatch { .. } => Self::Corrupt(e.to_string()),
            StoreError::NotFound(id) => Self::NotFound(format!("object {id}")),
            other => Self::Store(other),
        }
    }
}

impl From<RefError> for EngineError {
    fn from(e: RefError) -> Self {
        match e {
            RefError::Conflict { .. } => Self::Conflict(e.to_string()),
            RefError::NotFound { .. } => Self::NotFound(e.to_string()),
            RefError::InvalidBranchName { .. } => Self::InvalidArgument(e.to_string()),
            other => Self::Ref(other),
        }
    }
}

impl From<DagError> for EngineError {
    fn from(e: DagError) -> Self {
        match e {
            DagError::Store(e) => e.into(),
            other => Self::Corrupt(other.to_string()),
        }
    }
}

impl From<MergeError> for EngineError {
    fn from(e: MergeError) -> Self {
        match e {
            MergeError::InvalidResolution(reason) => Self::InvalidArgument(reason),
            MergeError::IncomingNotFound(id) => {
                Self::NotFound(format!("commit {id} cannot be found"))
            }
            MergeError::Dag(e) => e.into(),
            MergeError::Store(e) => e.into(),
        }
    }
}

impl From<WorkspaceError> for EngineError {
    fn from(e: WorkspaceError) -> Self {
        match e {
            WorkspaceError::InvalidName(_) => Self::InvalidArgument(e.to_string()),
            other => Self::Corrupt(other.to_string()),
        }
    }
}

impl From<PackError> for EngineError {
    fn from(e: PackError) -> Self {
        match e {
            PackError::Store(e) => e.into(),
            other => Self::Transport(SyncError::Pack(other)),
        }
    }
}

impl From<SyncError> for EngineError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Conflict(reason) => Self::Conflict(reason),
            SyncError::NotFound(reason) => Self::NotFound(reason),
            SyncError::Store(e) => e.into(),
            SyncError::Ref(e) => e.into(),
            SyncError::Dag(e) => e.into(),
            other => Self::Transport(other),
        }
    }
}

impl From<TypeError> for EngineError {
    fn from(e: TypeError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_refs::RefKind;
    use strand_types::ObjectId;

    fn id() -> ObjectId {
        ObjectId::from_hash([7; 32])
    }

    #[test]
    fn cas_mismatch_is_conflict() {
        let e: EngineError = RefError::Conflict {
            kind: RefKind::Local,
            branch: "main".into(),
            expected: None,
            actual: Some(id()),
        }
        .into();
        assert!(matches!(e, EngineError::Conflict(_)));
    }

    #[test]
    fn missing_parent_in_walk_is_corrupt() {
        let e: EngineError = DagError::MissingCommit(id()).into();
        assert!(matches!(e, EngineError::Corrupt(_)));
        let e: EngineError = MergeError::Dag(DagError::MissingCommit(id())).into();
        assert!(matches!(e, EngineError::Corrupt(_)));
    }

    #[test]
    fn merge_errors_reclassified() {
        let e: EngineError = MergeError::InvalidResolution("nope".into()).into();
        assert!(matches!(e, EngineError::InvalidArgument(_)));
        let e: EngineError = MergeError::IncomingNotFound(id()).into();
        assert!(matches!(e, EngineError::NotFound(_)));
    }

    #[test]
    fn remote_categories_survive() {
        let e: EngineError = SyncError::Conflict("non fast-forward".into()).into();
        assert!(matches!(e, EngineError::Conflict(m) if m == "non fast-forward"));
        let e: EngineError = SyncError::Disconnected.into();
        assert!(matches!(e, EngineError::Transport(SyncError::Disconnected)));
    }

    #[test]
    fn unrepresentable_commit_is_invalid_argument() {
        let e: EngineError = StoreError::InvalidObject("author has newline".into()).into();
        assert!(matches!(e, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn malformed_id_is_invalid_argument() {
        let e: EngineError = "zz".parse::<ObjectId>().unwrap_err().into();
        assert!(matches!(e, EngineError::InvalidArgument(_)));
    }
}
