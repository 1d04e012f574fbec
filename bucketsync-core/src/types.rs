//! Domain types for bucketsync.
//!
//! Jobs are plain values: created once by the planner, consumed once by the
//! executor. Local paths and remote keys are carried as `String` because
//! remote keys are always `/`-separated regardless of platform.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_CONCURRENCY;

/// Invalidation pattern covering every cached path.
pub const INVALIDATE_ALL: &str = "/*";

/// Redirect source key → redirect target.
pub type RedirectTable = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// What a [`Job`] does against the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    Upload,
    Redirect,
    Delete,
    InvalidateCache,
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobAction::Upload => write!(f, "upload"),
            JobAction::Redirect => write!(f, "redirect"),
            JobAction::Delete => write!(f, "delete"),
            JobAction::InvalidateCache => write!(f, "invalidate"),
        }
    }
}

/// A single unit of work for the executor.
///
/// `local` is a filesystem path for uploads, the redirect source key for
/// redirects, and absent for deletes and invalidations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Job {
    action: JobAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    local: Option<String>,
    remote: String,
}

impl Job {
    pub fn upload(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            action: JobAction::Upload,
            local: Some(local.into()),
            remote: remote.into(),
        }
    }

    pub fn redirect(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            action: JobAction::Redirect,
            local: Some(source.into()),
            remote: target.into(),
        }
    }

    pub fn delete(remote: impl Into<String>) -> Self {
        Self {
            action: JobAction::Delete,
            local: None,
            remote: remote.into(),
        }
    }

    pub fn invalidate(pattern: impl Into<String>) -> Self {
        Self {
            action: JobAction::InvalidateCache,
            local: None,
            remote: pattern.into(),
        }
    }

    pub fn action(&self) -> JobAction {
        self.action
    }

    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn is_invalidation(&self) -> bool {
        self.action == JobAction::InvalidateCache
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.local {
            Some(local) => write!(f, "{} {} -> {}", self.action, local, self.remote),
            None => write!(f, "{} {}", self.action, self.remote),
        }
    }
}

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Lifecycle of a single sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Planning,
    Dispatching,
    Invalidating,
    Done,
    Aborted,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Aborted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Planning => write!(f, "planning"),
            RunState::Dispatching => write!(f, "dispatching"),
            RunState::Invalidating => write!(f, "invalidating"),
            RunState::Done => write!(f, "done"),
            RunState::Aborted => write!(f, "aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Per-object header rules consumed by the store when uploading.
///
/// `content_type` and `content_encoding` are keyed by file extension
/// (`.svg`); the other tables are keyed by glob pattern over the remote key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectPolicyConfig {
    pub access: BTreeMap<String, String>,
    pub cache_control: BTreeMap<String, String>,
    pub content_type: BTreeMap<String, String>,
    pub content_encoding: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, BTreeMap<String, String>>,
}

/// Everything a sync run needs, as read from the config file and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Bucket / namespace identifier of the remote store.
    pub bucket: String,
    /// Local directory to mirror.
    pub source: PathBuf,
    /// Remote prefix objects are placed under.
    pub target: String,
    /// Delete remote objects that have no local counterpart.
    pub delete: bool,
    pub redirects: RedirectTable,
    /// Cache distribution to invalidate after a successful run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidate: Option<String>,
    pub max_concurrency: usize,
    pub dry_run: bool,
    pub objects: ObjectPolicyConfig,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            source: PathBuf::from("."),
            target: String::new(),
            delete: false,
            redirects: RedirectTable::new(),
            invalidate: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            dry_run: false,
            objects: ObjectPolicyConfig::default(),
        }
    }
}

impl SyncSettings {
    pub fn invalidation_enabled(&self) -> bool {
        self.invalidate.as_deref().is_some_and(|d| !d.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
