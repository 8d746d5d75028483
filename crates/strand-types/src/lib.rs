//! Foundation types for Strand.
//!
//! Every other Strand crate depends on `strand-types`. The crate is kept
//! deliberately small: it owns the identifier that names every stored object
//! and the error produced when parsing one.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash)
//! - [`TypeError`] -- Parse failures for identifiers

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::ObjectId;
