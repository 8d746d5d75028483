//! Synchronization between Strand repositories.
//!
//! A [`Transport`] is the client's view of a remote repository: it answers
//! fetch requests with one [`UploadPack`](strand_pack::UploadPack) per branch
//! that has new history, and accepts pushed packs.
//!
//! Two transports are provided:
//!
//! - [`DirectTransport`] serves packs straight out of another store in the
//!   same process.
//! - [`FramedTransport`] speaks the `strand-protocol` wire format over any
//!   byte stream, usually a TCP connection to a [`PackServer`].
//!
//! Both delegate the serving side to [`serve_fetch`] and [`receive_push`], so
//! a remote behaves the same whichever way it is reached.

pub mod config;
pub mod direct;
pub mod error;
pub mod framed;
pub mod remote;
pub mod server;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::TransportConfig;
pub use direct::DirectTransport;
pub use error::{SyncError, SyncResult};
pub use framed::FramedTransport;
pub use remote::{receive_push, serve_fetch};
pub use server::PackServer;
pub use transport::Transport;
pub use types::{BranchUpdate, FetchResult, PushResult};
