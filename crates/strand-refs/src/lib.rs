//! Reference management for Strand.
//!
//! Refs are the only mutable state in a Strand repository: named pointers
//! from a branch to the commit at its tip. Everything a ref points to is
//! immutable.
//!
//! # Architecture
//!
//! - **Local refs** are this repository's own branches. They move on commit
//!   and merge.
//! - **Remote refs** track branches of a peer repository and are only updated
//!   by fetch and push.
//! - Every update is a compare-and-swap: the writer names the head it expects
//!   to replace, and the store rejects the write if the branch has moved.
//!   This is the sole synchronization point between concurrent writers.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- [`RefKind`] and [`BranchAndHead`]
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`names`] -- Branch name validation
//! - [`memory`] -- In-memory [`InMemoryRefStore`]

pub mod error;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use memory::InMemoryRefStore;
pub use names::validate_branch_name;
pub use traits::RefStore;
pub use types::{BranchAndHead, RefKind};
