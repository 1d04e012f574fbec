//! bucketsync core library: job model, sync settings, errors.
//!
//! Public API surface:
//! - [`types`]: jobs, run states, redirect tables, settings
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / sanitize settings

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    Job, JobAction, ObjectPolicyConfig, RedirectTable, RunState, SyncSettings, INVALIDATE_ALL,
};
