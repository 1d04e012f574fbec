//! YAML settings file and sanitization.
//!
//! # File layout
//!
//! ```yaml
//! bucket: my-site
//! source: public
//! target: /site
//! delete: true
//! max_concurrency: 16
//! invalidate: E2ABCDEF
//! redirects:
//!   old-page.html: https://example.com/new
//! objects:
//!   content_type:
//!     .wasm: application/wasm
//!   cache_control:
//!     "**/*.html": no-cache
//! ```
//!
//! Every key is optional; absent keys take [`SyncSettings::default`] values.
//! Loading never validates: call [`SyncSettings::sanitize`] once file values
//! and command-line overrides have been merged.

use std::path::Path;

use crate::error::ConfigError;
use crate::types::SyncSettings;

/// Upper bound on in-flight store calls when none is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load settings from a YAML file at `path`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<SyncSettings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if contents.trim().is_empty() {
        return Ok(SyncSettings::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Sanitize
// ---------------------------------------------------------------------------

impl SyncSettings {
    /// Validate required values and normalize the target prefix.
    ///
    /// The prefix is cleaned the way a path join would clean it, then loses
    /// its leading separator so it can be used directly as a listing prefix.
    pub fn sanitize(mut self) -> Result<Self, ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::MissingBucket);
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                value: self.max_concurrency,
            });
        }
        self.target = normalize_prefix(&self.target);
        Ok(self)
    }
}

/// Clean a remote prefix: accept either separator, drop empty and `.`
/// segments, resolve `..`, and never start or end with `/`.
pub fn normalize_prefix(target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in target.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
