use std::sync::{Mutex, MutexGuard};

use strand_pack::UploadPack;
use strand_protocol::{StrandCodec, StrandMessage};
use strand_refs::BranchAndHead;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::config::TransportConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::Transport;

/// Transport speaking the framed wire protocol over a byte stream.
///
/// The [`Transport`] port is synchronous, so each transport drives its
/// stream on a private current-thread runtime. Calls must not be made from
/// inside another tokio runtime.
///
/// Requests on one stream are serialized; each request waits for its reply
/// before the next is written.
pub struct FramedTransport<S> {
    runtime: Runtime,
    stream: Mutex<S>,
    codec: StrandCodec,
    config: TransportConfig,
}

fn client_runtime() -> SyncResult<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}

impl FramedTransport<TcpStream> {
    /// Open a TCP connection to a [`PackServer`](crate::PackServer).
    pub fn connect<A>(addr: A, config: &TransportConfig) -> SyncResult<Self>
    where
        A: ToSocketAddrs + Send + 'static,
    {
        let runtime = client_runtime()?;
        let limit = config.connect_timeout();
        let stream = runtime
            .block_on(async move { tokio::time::timeout(limit, TcpStream::connect(addr)).await })
            .map_err(|_| SyncError::TimedOut("connect"))??;
        stream.set_nodelay(true)?;
        debug!(peer = ?stream.peer_addr().ok(), "connected");
        Ok(Self::with_runtime(runtime, stream, config))
    }
}

impl<S> FramedTransport<S> {
    fn with_runtime(runtime: Runtime, stream: S, config: &TransportConfig) -> Self {
        Self {
            runtime,
            stream: Mutex::new(stream),
            codec: config.codec(),
            config: config.clone(),
        }
    }

    fn lock(&self) -> SyncResult<MutexGuard<'_, S>> {
        self.stream.lock().map_err(|_| SyncError::Disconnected)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> FramedTransport<S> {
    /// Wrap an established stream.
    pub fn new(stream: S, config: &TransportConfig) -> SyncResult<Self> {
        Ok(Self::with_runtime(client_runtime()?, stream, config))
    }

    /// Send one request and wait for the reply. `Error` replies become
    /// errors.
    fn request(&self, msg: &StrandMessage) -> SyncResult<StrandMessage> {
        let mut stream = self.lock()?;
        match self.runtime.block_on(self.exchange(&mut stream, msg))? {
            None => Err(SyncError::Disconnected),
            Some(StrandMessage::Error { code, message }) => {
                debug!(%code, message = %message, "remote reported error");
                Err(SyncError::from_remote(code, message))
            }
            Some(reply) => Ok(reply),
        }
    }

    async fn exchange(&self, stream: &mut S, msg: &StrandMessage) -> SyncResult<Option<StrandMessage>> {
        self.config
            .within_io_timeout("write", self.codec.write_frame(stream, msg))
            .await??;
        Ok(self
            .config
            .within_io_timeout("read", self.codec.read_frame(stream))
            .await??)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> Transport for FramedTransport<S> {
    fn fetch(&self, branches: &[BranchAndHead]) -> SyncResult<Vec<UploadPack>> {
        let request = StrandMessage::FetchRequest {
            branches: branches.to_vec(),
        };
        match self.request(&request)? {
            StrandMessage::FetchResponse { packs } => Ok(packs),
            other => Err(SyncError::UnexpectedResponse(other.type_name())),
        }
    }

    fn push(&self, pack: UploadPack) -> SyncResult<()> {
        let branch = pack.branch.clone();
        let head = pack.head;
        match self.request(&StrandMessage::PushRequest { pack })? {
            StrandMessage::PushAck { branch: acked, head: acked_head }
                if acked == branch && acked_head == head =>
            {
                Ok(())
            }
            other => Err(SyncError::UnexpectedResponse(other.type_name())),
        }
    }
}
