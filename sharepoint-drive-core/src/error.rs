//! Error types shared by the resolver, the document library and drive clients.
//!
//! - [`RemoteError`] is what a drive client reports for a single failed call.
//! - [`PathError`] rejects malformed logical paths before any remote call is made.
//! - [`DriveError`] is what the resolver and [`crate::library::DocumentLibrary`] return.

use thiserror::Error;

/// Failure of a single call against the remote drive.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service answered with an error status.
    #[error("Graph API error (HTTP {status}): {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// No usable access token.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Connection, timeout or other transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered, but not with what was expected.
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// True for a legitimate "no such item" answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Api { status: 404, .. })
    }
}

/// Rejection of a logical path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path has no segments")]
    Empty,

    #[error("path segment {index} is empty")]
    EmptySegment { index: usize },

    #[error("path segment {index} contains '/'")]
    DelimiterInSegment { index: usize },
}

/// Errors returned by path resolution and document library operations.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// A lookup failed and the resolver was told to propagate lookup errors.
    #[error("lookup of '{path}' failed: {source}")]
    Lookup {
        path: String,
        #[source]
        source: RemoteError,
    },

    /// Folder creation failed part way through a walk. `satisfied` prefixes
    /// out of `total` were already in place (found or created) when it failed.
    #[error("creating '{path}' failed with {satisfied} of {total} path segments in place: {source}")]
    RemoteOperation {
        path: String,
        satisfied: usize,
        total: usize,
        #[source]
        source: RemoteError,
    },

    /// A passthrough operation (upload, download, link) failed.
    #[error("{operation} of '{path}' failed: {source}")]
    Remote {
        operation: &'static str,
        path: String,
        #[source]
        source: RemoteError,
    },
}

impl DriveError {
    /// Some prefixes of the requested path exist remotely while later ones do
    /// not. Re-running `ensure_path` with the same path completes it.
    pub fn is_partial_path_created(&self) -> bool {
        matches!(self, DriveError::RemoteOperation { satisfied, .. } if *satisfied > 0)
    }
}
