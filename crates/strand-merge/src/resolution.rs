//! Conflict resolution policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, MergeResult};

/// How to settle a name whose blob differs between the two sides of a merge.
///
/// `UseLocalBranch` and `UseRemoteBranch` are the spellings used when merging
/// a remote-tracking branch into a local one; they mean `UseExisting` and
/// `UseIncoming` respectively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictResolution {
    /// Leave conflicts unresolved; nothing is written if any exist.
    #[default]
    Leave,
    /// Keep the incoming blob.
    UseIncoming,
    /// Keep the blob already on the branch.
    UseExisting,
    /// Keep the local branch's blob.
    UseLocalBranch,
    /// Keep the remote branch's blob.
    UseRemoteBranch,
}

impl ConflictResolution {
    /// Map branch aliases onto the commit-merge policies.
    pub fn normalize(self) -> Self {
        match self {
            Self::UseLocalBranch => Self::UseExisting,
            Self::UseRemoteBranch => Self::UseIncoming,
            other => other,
        }
    }

    /// Validate a policy for merging a commit into a branch.
    pub fn for_commit_merge(self) -> MergeResult<Self> {
        match self {
            Self::Leave | Self::UseIncoming | Self::UseExisting => Ok(self),
            other => Err(MergeError::InvalidResolution(format!(
                "{other} is only valid when merging branches"
            ))),
        }
    }

    /// Validate a policy for merging a remote branch into a local one and
    /// return its commit-merge equivalent.
    pub fn for_branch_merge(self) -> MergeResult<Self> {
        match self {
            Self::Leave | Self::UseLocalBranch | Self::UseRemoteBranch => Ok(self.normalize()),
            other => Err(MergeError::InvalidResolution(format!(
                "{other} is not valid when merging branches"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leave => "leave",
            Self::UseIncoming => "use-incoming",
            Self::UseExisting => "use-existing",
            Self::UseLocalBranch => "use-local-branch",
            Self::UseRemoteBranch => "use-remote-branch",
        }
    }
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictResolution {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leave" => Ok(Self::Leave),
            "use-incoming" => Ok(Self::UseIncoming),
            "use-existing" => Ok(Self::UseExisting),
            "use-local-branch" => Ok(Self::UseLocalBranch),
            "use-remote-branch" => Ok(Self::UseRemoteBranch),
            other => Err(MergeError::InvalidResolution(format!(
                "unknown policy {other:?}"
            ))),
        }
    }
}
