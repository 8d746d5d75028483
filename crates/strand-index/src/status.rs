//! Pending-change summary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Names of pending changes relative to some commit.
///
/// The three sets are disjoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Names absent from the commit.
    pub added: BTreeSet<String>,
    /// Names present in the commit with different content.
    pub modified: BTreeSet<String>,
    /// Names present in the commit and marked gone.
    pub removed: BTreeSet<String>,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes of any kind.
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Total number of changed names.
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_clean()
    }
}
