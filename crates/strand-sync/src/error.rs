use strand_dag::DagError;
use strand_pack::PackError;
use strand_protocol::{ErrorCode, ProtocolError};
use strand_refs::RefError;
use strand_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("remote error ({code}): {message}")]
    Remote { code: ErrorCode, message: String },

    #[error("unexpected {0} response")]
    UnexpectedResponse(&'static str),

    #[error("connection closed by peer")]
    Disconnected,

    #[error("timed out during {0}")]
    TimedOut(&'static str),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("pack error: {0}")]
    Pack(#[from] PackError),

    #[error("dag error: {0}")]
    Dag(#[from] DagError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] RefError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Wire error code reported to a client for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Conflict(_) | Self::Ref(RefError::Conflict { .. }) => ErrorCode::Conflict,
            Self::NotFound(_)
            | Self::Ref(RefError::NotFound { .. })
            | Self::Store(StoreError::NotFound(_))
            | Self::Pack(PackError::MissingHead { .. }) => ErrorCode::NotFound,
            Self::Remote { code, .. } => *code,
            _ => ErrorCode::Unknown,
        }
    }

    /// Rebuild the client-side error for a remote `Error` frame.
    pub fn from_remote(code: ErrorCode, message: String) -> Self {
        match code {
            ErrorCode::Conflict => Self::Conflict(message),
            ErrorCode::NotFound => Self::NotFound(message),
            ErrorCode::Unknown => Self::Remote { code, message },
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
