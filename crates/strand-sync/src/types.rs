use serde::{Deserialize, Serialize};
use strand_types::ObjectId;

/// A remote-tracking ref that moved during a fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchUpdate {
    pub branch: String,
    pub old_head: Option<ObjectId>,
    pub new_head: ObjectId,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub updated: Vec<BranchUpdate>,
    pub commits_received: usize,
    pub blobs_received: usize,
}

impl FetchResult {
    pub fn is_up_to_date(&self) -> bool {
        self.updated.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResult {
    pub branch: String,
    pub head: ObjectId,
    /// `false` when the remote already had everything and was not contacted.
    pub sent: bool,
    pub commits_sent: usize,
    pub blobs_sent: usize,
}
