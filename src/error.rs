//! Error types.

use thiserror::Error;

/// Result alias for hosts file operations.
pub type Result<T> = std::result::Result<T, HostsError>;

/// Errors returned by hosts file operations.
#[derive(Debug, Error)]
pub enum HostsError {
    /// Opening, locking, reading, writing or renaming the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded (it has no host names).
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl HostsError {
    /// Returns `true` if the underlying I/O error is `PermissionDenied`.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}
