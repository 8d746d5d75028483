use std::net::SocketAddr;
use std::sync::Arc;

use strand_protocol::{ErrorCode, ProtocolError, StrandCodec, StrandMessage};
use strand_refs::RefStore;
use strand_store::ObjectStore;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::config::TransportConfig;
use crate::error::SyncResult;
use crate::remote::{receive_push, serve_fetch};

/// Answers framed fetch and push requests against a store.
pub struct PackServer<S: ?Sized> {
    store: Arc<S>,
    config: TransportConfig,
    codec: StrandCodec,
}

impl<S: ?Sized> Clone for PackServer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            codec: self.codec,
        }
    }
}

impl<S> PackServer<S>
where
    S: ObjectStore + RefStore + ?Sized,
{
    pub fn new(store: Arc<S>, config: TransportConfig) -> Self {
        let codec = config.codec();
        Self {
            store,
            config,
            codec,
        }
    }

    /// Produce the reply for one request. Failures become `Error` replies.
    pub fn handle(&self, request: StrandMessage) -> StrandMessage {
        let store = &*self.store;
        match request {
            StrandMessage::FetchRequest { branches } => {
                match serve_fetch(store, store, &branches) {
                    Ok(packs) => StrandMessage::FetchResponse { packs },
                    Err(e) => StrandMessage::error(e.code(), e.to_string()),
                }
            }
            StrandMessage::PushRequest { pack } => match receive_push(store, store, &pack) {
                Ok(_) => StrandMessage::PushAck {
                    branch: pack.branch,
                    head: pack.head,
                },
                Err(e) => StrandMessage::error(e.code(), e.to_string()),
            },
            other => StrandMessage::error(
                ErrorCode::Unknown,
                format!("unexpected {} request", other.type_name()),
            ),
        }
    }
}

impl<S> PackServer<S>
where
    S: ObjectStore + RefStore + Send + Sync + ?Sized + 'static,
{
    /// Serve requests on one connection until the peer closes it.
    ///
    /// Store work runs on the blocking pool. A frame that fails to decode is
    /// answered with an `Error` reply and ends the connection, since the
    /// stream position can no longer be trusted.
    pub async fn serve_connection<T>(&self, mut stream: T) -> SyncResult<()>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let read = self
                .config
                .within_io_timeout("read", self.codec.read_frame(&mut stream))
                .await?;
            let request = match read {
                Ok(Some(request)) => request,
                Ok(None) => return Ok(()),
                Err(ProtocolError::Io(e)) => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "rejecting malformed frame");
                    let reply = StrandMessage::error(ErrorCode::Unknown, e.to_string());
                    self.codec.write_frame(&mut stream, &reply).await?;
                    return Err(e.into());
                }
            };
            let kind = request.type_name();
            let server = self.clone();
            let reply = tokio::task::spawn_blocking(move || server.handle(request)).await?;
            debug!(request = kind, reply = reply.type_name(), "request served");
            self.config
                .within_io_timeout("write", self.codec.write_frame(&mut stream, &reply))
                .await??;
        }
    }

    /// Accept connections until the listener fails, serving each on its own
    /// task.
    pub async fn serve_tcp(&self, listener: TcpListener) -> SyncResult<()> {
        info!(addr = ?listener.local_addr().ok(), "pack server listening");
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            };
            let server = self.clone();
            tokio::spawn(async move { server.serve_tcp_stream(stream, peer).await });
        }
    }

    async fn serve_tcp_stream(&self, stream: TcpStream, peer: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!(%peer, error = %e, "could not configure connection");
            return;
        }
        debug!(%peer, "connection opened");
        match self.serve_connection(stream).await {
            Ok(()) => debug!(%peer, "connection closed"),
            Err(e) => warn!(%peer, error = %e, "connection ended with error"),
        }
    }
}
