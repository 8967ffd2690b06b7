//! Receipt Routing Core
//!
//! This library turns a scanned document's filename into a destination folder
//! inside the remote document service:
//!
//! - `fragment`: pull a short candidate name out of a noisy filename
//! - `matcher`: match that fragment against the employee roster
//! - `directory`: list child folders of a remote folder (HTTP, cached, in-memory)
//! - `resolver`: walk sector → employee → target subfolder, with a
//!   sibling-sector fallback when the suggested sector does not hold the employee
//!
//! # Flow
//!
//! ```text
//! filename ─► fragment ─► roster entry ─► folder id ─► (signing dispatcher)
//! ```
//!
//! Nothing in this crate returns an error for a missing employee or folder:
//! absence is a `Resolution` value, and listing failures surface as
//! `Resolution::Unreachable` so the caller can log them and move on.

pub mod config;
pub mod directory;
pub mod error;
pub mod fragment;
pub mod matcher;
pub mod resolver;
pub mod roster;

pub use config::RoutingConfig;
pub use directory::{
    normalize_label, CachedDirectory, FolderDirectory, FolderId, FolderMap, HttpFolderDirectory,
    InMemoryDirectory,
};
pub use error::{DirectoryError, DirectoryResult};
pub use fragment::FragmentExtractor;
pub use matcher::match_fragment;
pub use resolver::{FolderResolver, Resolution};
pub use roster::{Roster, RosterEntry};
