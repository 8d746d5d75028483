//! Content addressing for Strand.
//!
//! Provides domain-separated BLAKE3 hashing. Every object kind hashes under
//! its own domain tag so that two objects of different kinds never share an
//! identifier, even when their canonical encodings are byte-identical.

pub mod hasher;

pub use hasher::ContentHasher;
