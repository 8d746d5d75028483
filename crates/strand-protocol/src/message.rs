use std::fmt;

use serde::{Deserialize, Serialize};
use strand_pack::UploadPack;
use strand_refs::BranchAndHead;
use strand_types::ObjectId;

pub const PROTOCOL_VERSION: u32 = 1;
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Structured failure category echoed back to the requesting side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// A ref moved underneath the request, or the update is not a
    /// fast-forward.
    Conflict,
    /// A branch or object the request relies on does not exist.
    NotFound,
    Unknown,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict => write!(f, "conflict"),
            Self::NotFound => write!(f, "not-found"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// All message types in the Strand protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrandMessage {
    /// Ask for new history on each branch beyond the advertised head.
    FetchRequest { branches: Vec<BranchAndHead> },
    /// One pack per branch that has new history.
    FetchResponse { packs: Vec<UploadPack> },
    /// Offer a pack to be stored and published on its branch.
    PushRequest { pack: UploadPack },
    /// The pushed pack was stored and the branch now points at `head`.
    PushAck { branch: String, head: ObjectId },
    Error { code: ErrorCode, message: String },
}

impl StrandMessage {
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::FetchRequest { .. } => 1,
            Self::FetchResponse { .. } => 2,
            Self::PushRequest { .. } => 3,
            Self::PushAck { .. } => 4,
            Self::Error { .. } => 255,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::FetchRequest { .. } => "FetchRequest",
            Self::FetchResponse { .. } => "FetchResponse",
            Self::PushRequest { .. } => "PushRequest",
            Self::PushAck { .. } => "PushAck",
            Self::Error { .. } => "Error",
        }
    }

    /// Whether `tag` names a known message type.
    pub fn is_known_tag(tag: u8) -> bool {
        matches!(tag, 1..=4 | 255)
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}
