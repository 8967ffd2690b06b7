//! Folder listing errors.
//!
//! These never cross the resolver boundary as `Err`; the resolver folds them
//! into `Resolution::Unreachable`.

use thiserror::Error;

use crate::directory::FolderId;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("listing request for folder {parent} failed: {message}")]
    Transport { parent: FolderId, message: String },

    /// The service answered with a non-success status.
    #[error("listing for folder {parent} returned HTTP {status}")]
    Status { parent: FolderId, status: u16 },

    /// Body was not JSON or had no `data` array.
    #[error("listing for folder {parent} had an unusable payload: {message}")]
    Payload { parent: FolderId, message: String },
}

impl DirectoryError {
    pub fn parent(&self) -> FolderId {
        match self {
            Self::Transport { parent, .. }
            | Self::Status { parent, .. }
            | Self::Payload { parent, .. } => *parent,
        }
    }
}
