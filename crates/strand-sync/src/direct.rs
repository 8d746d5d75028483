use std::sync::Arc;

use strand_pack::UploadPack;
use strand_refs::{BranchAndHead, RefStore};
use strand_store::ObjectStore;

use crate::error::SyncResult;
use crate::remote::{receive_push, serve_fetch};
use crate::transport::Transport;

/// Transport that talks to another store in the same process.
pub struct DirectTransport<S: ?Sized> {
    remote: Arc<S>,
}

impl<S: ?Sized> DirectTransport<S> {
    pub fn new(remote: Arc<S>) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> &Arc<S> {
        &self.remote
    }
}

impl<S: ?Sized> Clone for DirectTransport<S> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
        }
    }
}

impl<S> Transport for DirectTransport<S>
where
    S: ObjectStore + RefStore + ?Sized,
{
    fn fetch(&self, branches: &[BranchAndHead]) -> SyncResult<Vec<UploadPack>> {
        serve_fetch(&*self.remote, &*self.remote, branches)
    }

    fn push(&self, pack: UploadPack) -> SyncResult<()> {
        receive_push(&*self.remote, &*self.remote, &pack).map(|_| ())
    }
}
