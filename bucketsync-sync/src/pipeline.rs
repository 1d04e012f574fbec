//! Shared sync entrypoint used by the CLI.

use std::sync::Arc;

use serde::Serialize;

use bucketsync_core::{Job, RunState, SyncSettings, INVALIDATE_ALL};
use bucketsync_store::RemoteStore;

use crate::executor::{self, ExecutionSummary};
use crate::observer::SyncObserver;
use crate::planner;
use crate::SyncError;

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub state: RunState,
    /// Jobs in the plan, invalidation included.
    pub planned: usize,
    pub summary: ExecutionSummary,
}

/// Validate settings, list the target prefix, and build the full job list
/// (invalidation job last, when enabled). Nothing is written.
pub async fn plan<S>(
    settings: &SyncSettings,
    store: &S,
    observer: &dyn SyncObserver,
) -> Result<Vec<Job>, SyncError>
where
    S: RemoteStore + ?Sized,
{
    let settings = settings.clone().sanitize()?;
    observer.state_changed(RunState::Planning);

    let remote = store
        .list(&settings.target)
        .await
        .map_err(|source| SyncError::List {
            prefix: settings.target.clone(),
            source,
        })?;
    tracing::debug!(prefix = %settings.target, listed = remote.len(), "listed remote prefix");

    let mut jobs = planner::plan(
        &settings.source,
        &settings.target,
        &remote,
        &settings.redirects,
        settings.delete,
        observer,
    )?;
    if settings.invalidation_enabled() {
        jobs.push(Job::invalidate(INVALIDATE_ALL));
    }
    Ok(jobs)
}

/// Plan and execute one run.
///
/// Any error leaves the run `Aborted`; the observer sees the transition.
pub async fn sync<S>(
    settings: &SyncSettings,
    store: Arc<S>,
    observer: &dyn SyncObserver,
) -> Result<SyncReport, SyncError>
where
    S: RemoteStore + ?Sized + 'static,
{
    let jobs = match plan(settings, store.as_ref(), observer).await {
        Ok(jobs) => jobs,
        Err(err) => {
            observer.state_changed(RunState::Aborted);
            return Err(err);
        }
    };
    let planned = jobs.len();
    tracing::info!(bucket = %settings.bucket, jobs = planned, "synchronizing");

    let summary = executor::run(jobs, store, settings.max_concurrency, observer).await?;
    Ok(SyncReport {
        state: RunState::Done,
        planned,
        summary,
    })
}
