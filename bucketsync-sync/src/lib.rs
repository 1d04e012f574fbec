//! # bucketsync-sync
//!
//! Plan and execute a directory → bucket sync.
//!
//! [`planner::plan`] diffs the local tree against a remote listing and emits
//! jobs; [`executor::run`] dispatches them with bounded concurrency, stops on
//! the first failure, and only then issues the cache invalidation.
//! [`pipeline::sync`] strings the two together from [`SyncSettings`].
//!
//! [`SyncSettings`]: bucketsync_core::SyncSettings

pub mod error;
pub mod executor;
pub mod observer;
pub mod pipeline;
pub mod planner;

pub use error::SyncError;
pub use executor::{ExecutionSummary, JobResult};
pub use observer::{NoopObserver, SyncObserver, TracingObserver};
pub use pipeline::SyncReport;
