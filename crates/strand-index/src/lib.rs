//! Staging workspace for Strand.
//!
//! A [`Workspace`] is bound to a commit (or to nothing) and records pending
//! changes against that commit's index: names added, names whose content
//! changed, and names removed. Committing or checking out consumes the
//! pending changes and rebinds the workspace.
//!
//! The workspace never touches a store. Materializing contents on checkout
//! and writing blobs on commit are the caller's job; the workspace only
//! tracks state.
//!
//! # Key Types
//!
//! - [`Workspace`] -- The staging state machine
//! - [`Status`] -- Names of pending changes by category

pub mod error;
pub mod status;
pub mod workspace;

pub use error::{WorkspaceError, WorkspaceResult};
pub use status::Status;
pub use workspace::Workspace;
