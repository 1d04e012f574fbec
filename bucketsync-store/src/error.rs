//! Error types for bucketsync-store.

use std::path::PathBuf;

use thiserror::Error;

/// Any failure of a [`RemoteStore`](crate::RemoteStore) operation.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key cannot be stored (empty, absolute, `..` segments, reserved).
    #[error("invalid object key '{key}'")]
    InvalidKey { key: String },

    /// Object index JSON serialization/deserialization error.
    #[error("object index JSON error: {0}")]
    Index(#[from] serde_json::Error),

    /// A header policy glob failed to compile.
    #[error("invalid object pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The store refused the operation.
    #[error("{op} rejected for '{key}': {reason}")]
    Rejected {
        op: &'static str,
        key: String,
        reason: String,
    },
}

/// Convenience constructor for [`RemoteError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RemoteError {
    RemoteError::Io {
        path: path.into(),
        source,
    }
}
