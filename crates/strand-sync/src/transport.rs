use strand_pack::UploadPack;
use strand_refs::BranchAndHead;

use crate::error::SyncResult;

/// Client-side port to a remote repository.
///
/// Failures are reported with the remote's error category: a push the
/// remote refuses because its branch moved or the pack does not extend it is
/// [`SyncError::Conflict`](crate::SyncError::Conflict).
pub trait Transport: Send + Sync {
    /// Request every commit and blob on each branch beyond the advertised
    /// head. Branches with nothing new are left out of the reply.
    fn fetch(&self, branches: &[BranchAndHead]) -> SyncResult<Vec<UploadPack>>;

    /// Offer a pack to be stored and published on `pack.branch`.
    fn push(&self, pack: UploadPack) -> SyncResult<()>;
}
