//! Wire protocol for Strand.
//!
//! Defines the messages exchanged between two repositories during fetch and
//! push, and the framing used to carry them over a byte stream.
//!
//! # Frame layout
//!
//! ```text
//! [u32 BE length][u8 type tag][u32 BE CRC32 of payload][bincode payload]
//! ```
//!
//! `length` covers everything after itself. A frame whose checksum or tag
//! does not match its payload is rejected before the payload is used, so a
//! pack is either delivered whole or not at all.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::StrandCodec;
pub use error::{ProtocolError, ProtocolResult};
pub use message::{ErrorCode, StrandMessage, DEFAULT_MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
