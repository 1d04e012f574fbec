//! Error types for bucketsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use bucketsync_core::{ConfigError, Job, JobAction};
use bucketsync_store::RemoteError;

/// All errors that can end a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Settings were rejected before planning started.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The local tree could not be enumerated.
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Listing the remote prefix failed.
    #[error("failed to list remote prefix '{prefix}': {source}")]
    List {
        prefix: String,
        #[source]
        source: RemoteError,
    },

    /// The first job that failed; the run was aborted.
    #[error("failed to {action} {local} to {remote}: {source}")]
    Job {
        action: JobAction,
        local: String,
        remote: String,
        #[source]
        source: RemoteError,
    },

    /// A plan carried more than one invalidation job.
    #[error("plan contains more than one cache invalidation job")]
    DuplicateInvalidation,

    /// A worker task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),
}

impl SyncError {
    pub(crate) fn job(job: &Job, source: RemoteError) -> Self {
        SyncError::Job {
            action: job.action(),
            local: job.local().unwrap_or_default().to_string(),
            remote: job.remote().to_string(),
            source,
        }
    }
}
