use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strand_protocol::{StrandCodec, DEFAULT_MAX_MESSAGE_SIZE};

use crate::error::{SyncError, SyncResult};

/// Settings shared by [`FramedTransport`](crate::FramedTransport) and
/// [`PackServer`](crate::PackServer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Largest frame payload accepted or produced, in bytes.
    pub max_frame_size: usize,
    pub connect_timeout_ms: u64,
    /// Read and write timeout on established connections. Zero disables it.
    pub io_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_MESSAGE_SIZE,
            connect_timeout_ms: 5_000,
            io_timeout_ms: 30_000,
        }
    }
}

impl TransportConfig {
    pub fn from_toml_str(text: &str) -> SyncResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SyncError::Config(e.to_string()))?;
        if config.max_frame_size == 0 {
            return Err(SyncError::Config("max_frame_size must be positive".into()));
        }
        Ok(config)
    }

    pub fn codec(&self) -> StrandCodec {
        StrandCodec::new(self.max_frame_size)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        (self.io_timeout_ms > 0).then(|| Duration::from_millis(self.io_timeout_ms))
    }

    /// Await `fut`, giving up after the I/O timeout if one is set.
    pub(crate) async fn within_io_timeout<F: Future>(
        &self,
        what: &'static str,
        fut: F,
    ) -> SyncResult<F::Output> {
        match self.io_timeout() {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| SyncError::TimedOut(what)),
            None => Ok(fut.await),
        }
    }
}
