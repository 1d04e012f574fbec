//! Error types for bucketsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or validating sync settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No bucket / namespace identifier was configured.
    #[error("must set 'bucket'")]
    MissingBucket,

    /// `max_concurrency` must admit at least one job.
    #[error("max_concurrency must be at least 1 (got {value})")]
    InvalidConcurrency { value: usize },

    /// The config file did not exist at the expected path.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure while reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
