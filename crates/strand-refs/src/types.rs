//! Core ref types.

use std::fmt;

use serde::{Deserialize, Serialize};
use strand_types::ObjectId;

/// Which ref table a branch lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefKind {
    /// This repository's own branches.
    Local,
    /// Remote-tracking heads, moved only by fetch and push.
    Remote,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// A named pointer into the commit graph. A branch with no commits has no
/// head.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchAndHead {
    pub branch: String,
    pub head: Option<ObjectId>,
}

impl BranchAndHead {
    pub fn new(branch: impl Into<String>, head: Option<ObjectId>) -> Self {
        Self {
            branch: branch.into(),
            head,
        }
    }

    /// A branch without commits.
    pub fn empty(branch: impl Into<String>) -> Self {
        Self::new(branch, None)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl fmt::Display for BranchAndHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.head {
            Some(head) => write!(f, "{} -> {}", self.branch, head.short_hex()),
            None => write!(f, "{} (empty)", self.branch),
        }
    }
}
