//! Name-by-name merge of two flat indexes.

use std::collections::BTreeSet;

use strand_store::Index;

use crate::resolution::ConflictResolution;

/// Result of [`auto_merge`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AutoMerge {
    /// The merged name-to-blob mapping.
    pub index: Index,
    /// Names whose blobs differ between the two sides.
    pub conflicts: BTreeSet<String>,
}

impl AutoMerge {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Merge `incoming` into `existing`.
///
/// Names on only one side, and names with identical blobs on both, are
/// copied through. A name with different blobs is recorded as a conflict and
/// then dropped (`Leave`), or taken from the side the policy names. Branch
/// aliases are normalized first.
pub fn auto_merge(incoming: &Index, existing: &Index, resolution: ConflictResolution) -> AutoMerge {
    let resolution = resolution.normalize();
    let mut merged = AutoMerge {
        index: existing.clone(),
        conflicts: BTreeSet::new(),
    };
    for (name, incoming_blob) in incoming {
        match existing.get(name) {
            Some(existing_blob) if existing_blob != incoming_blob => {
                merged.conflicts.insert(name.clone());
                match resolution {
                    ConflictResolution::UseIncoming => {
                        merged.index.insert(name.clone(), *incoming_blob);
                    }
                    ConflictResolution::UseExisting => {}
                    _ => {
                        merged.index.remove(name);
                    }
                }
            }
            _ => {
                merged.index.insert(name.clone(), *incoming_blob);
            }
        }
    }
    merged
}
