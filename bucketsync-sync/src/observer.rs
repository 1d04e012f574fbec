//! Hooks into planning and execution.
//!
//! The planner and executor report to a [`SyncObserver`] at fixed points
//! instead of printing. [`TracingObserver`] forwards to `tracing`;
//! [`NoopObserver`] discards everything.

use bucketsync_core::{Job, RunState};

use crate::executor::JobResult;

/// Receives progress events from a sync run.
///
/// Every method has an empty default so implementors only override what
/// they care about. Calls come from the coordinating task, never from
/// workers, but implementations must still be `Send + Sync` because the
/// executor is driven from async code.
pub trait SyncObserver: Send + Sync {
    fn state_changed(&self, _state: RunState) {}

    /// A listed remote key was compared against the local key set.
    fn delete_candidate(&self, _remote: &str, _key: &str, _matched: bool) {}

    /// A listed remote key did not start with the listing prefix.
    fn remote_outside_prefix(&self, _remote: &str, _prefix: &str) {}

    fn job_dispatched(&self, _job: &Job) {}

    fn job_completed(&self, _result: &JobResult) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn state_changed(&self, state: RunState) {
        tracing::debug!(%state, "run state changed");
    }

    fn delete_candidate(&self, remote: &str, key: &str, matched: bool) {
        if matched {
            tracing::debug!(remote, key, "remote key has a local counterpart");
        } else {
            tracing::debug!(remote, key, "no local counterpart, scheduling delete");
        }
    }

    fn remote_outside_prefix(&self, remote: &str, prefix: &str) {
        tracing::warn!(remote, prefix, "listed key is outside the target prefix");
    }

    fn job_dispatched(&self, job: &Job) {
        tracing::debug!(
            action = %job.action(),
            local = job.local().unwrap_or_default(),
            remote = job.remote(),
            "dispatching job",
        );
    }

    fn job_completed(&self, result: &JobResult) {
        let job = &result.job;
        match &result.error {
            None => tracing::info!(
                action = %job.action(),
                local = job.local().unwrap_or_default(),
                remote = job.remote(),
                "job completed",
            ),
            Some(err) => tracing::error!(
                action = %job.action(),
                local = job.local().unwrap_or_default(),
                remote = job.remote(),
                error = %err,
                "job failed",
            ),
        }
    }
}
