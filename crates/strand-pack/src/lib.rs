//! Upload packs for Strand.
//!
//! An [`UploadPack`] carries the commits and blobs needed to replay a
//! branch's history up to a stated head, on top of history the receiver
//! already has. Packs are the unit of transfer for fetch and push.
//!
//! # Guarantees
//!
//! - **Verified**: every object's id is re-derived from its content and the
//!   head is part of the pack.
//! - **Closed**: every parent and blob a packed commit references is either
//!   in the pack or already in the receiving store.
//! - **Atomic**: [`UploadPack::apply`] checks both before writing anything,
//!   so a rejected pack leaves the store untouched.
//!
//! A pack is also a read-only [`ObjectStore`](strand_store::ObjectStore), so
//! graph walks can run over its contents before they are stored.

pub mod error;
pub mod pack;
pub mod view;

pub use error::{PackError, PackResult};
pub use pack::{PackStats, UploadPack};
