//! Bounded-concurrency job execution.
//!
//! ## Run protocol
//!
//! 1. Split the plan into sync jobs and at most one invalidation job.
//! 2. Spawn sync jobs onto a `JoinSet`, never more than `max_concurrency`
//!    at once; a new job is admitted only after a finished one is collected.
//! 3. The first failed result stops admission and moves the run to
//!    `Aborted`. Jobs already in flight are drained; their outcomes are
//!    logged at debug level and never reach the observer.
//! 4. Only when every sync job succeeded is the invalidation issued, on the
//!    coordinating task.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::{JoinError, JoinSet};

use bucketsync_core::{Job, JobAction, RunState};
use bucketsync_store::{RemoteError, RemoteStore};

use crate::error::SyncError;
use crate::observer::SyncObserver;

/// Outcome of one dispatched job.
#[derive(Debug)]
pub struct JobResult {
    pub job: Job,
    pub error: Option<RemoteError>,
}

impl JobResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Counts of what a successful run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub uploaded: usize,
    pub redirected: usize,
    pub deleted: usize,
    pub invalidated: bool,
}

impl ExecutionSummary {
    fn record(&mut self, action: JobAction) {
        match action {
            JobAction::Upload => self.uploaded += 1,
            JobAction::Redirect => self.redirected += 1,
            JobAction::Delete => self.deleted += 1,
            JobAction::InvalidateCache => self.invalidated = true,
        }
    }
}

/// Execute `jobs` against `store`.
///
/// Returns the first failure as [`SyncError::Job`]; the invalidation job is
/// never issued after a failure.
pub async fn run<S>(
    jobs: Vec<Job>,
    store: Arc<S>,
    max_concurrency: usize,
    observer: &dyn SyncObserver,
) -> Result<ExecutionSummary, SyncError>
where
    S: RemoteStore + ?Sized + 'static,
{
    let (sync_jobs, invalidate_job) = partition(jobs)?;
    let max_concurrency = max_concurrency.max(1);
    let mut summary = ExecutionSummary::default();
    let mut failure: Option<SyncError> = None;
    let mut in_flight: JoinSet<JobResult> = JoinSet::new();

    observer.state_changed(RunState::Dispatching);
    for job in sync_jobs {
        while let Some(joined) = in_flight.try_join_next() {
            settle(joined, &mut summary, &mut failure, observer);
        }
        while failure.is_none() && in_flight.len() >= max_concurrency {
            if let Some(joined) = in_flight.join_next().await {
                settle(joined, &mut summary, &mut failure, observer);
            }
        }
        if failure.is_some() {
            break;
        }

        observer.job_dispatched(&job);
        let store = Arc::clone(&store);
        in_flight.spawn(async move {
            let error = dispatch(store.as_ref(), &job).await.err();
            JobResult { job, error }
        });
    }

    // Drain whatever is still running so no task outlives the run.
    while let Some(joined) = in_flight.join_next().await {
        settle(joined, &mut summary, &mut failure, observer);
    }

    if let Some(err) = failure {
        return Err(err);
    }

    if let Some(job) = invalidate_job {
        observer.state_changed(RunState::Invalidating);
        observer.job_dispatched(&job);
        let result = JobResult {
            error: dispatch(store.as_ref(), &job).await.err(),
            job,
        };
        observer.job_completed(&result);
        if let Some(source) = result.error {
            observer.state_changed(RunState::Aborted);
            return Err(SyncError::job(&result.job, source));
        }
        summary.record(JobAction::InvalidateCache);
    }

    observer.state_changed(RunState::Done);
    Ok(summary)
}

/// Pull the invalidation job out before anything is dispatched.
fn partition(jobs: Vec<Job>) -> Result<(Vec<Job>, Option<Job>), SyncError> {
    let mut sync_jobs = Vec::with_capacity(jobs.len());
    let mut invalidate_job = None;
    for job in jobs {
        if job.is_invalidation() {
            if invalidate_job.is_some() {
                return Err(SyncError::DuplicateInvalidation);
            }
            invalidate_job = Some(job);
        } else {
            sync_jobs.push(job);
        }
    }
    Ok((sync_jobs, invalidate_job))
}

/// One store call per job.
async fn dispatch<S>(store: &S, job: &Job) -> Result<(), RemoteError>
where
    S: RemoteStore + ?Sized,
{
    match job.action() {
        JobAction::Upload => {
            let local = job.local().unwrap_or_default();
            store.upload(Path::new(local), job.remote()).await
        }
        JobAction::Redirect => {
            store
                .redirect(job.local().unwrap_or_default(), job.remote())
                .await
        }
        JobAction::Delete => store.delete(job.remote()).await,
        JobAction::InvalidateCache => store.invalidate(job.remote()).await,
    }
}

fn settle(
    joined: Result<JobResult, JoinError>,
    summary: &mut ExecutionSummary,
    failure: &mut Option<SyncError>,
    observer: &dyn SyncObserver,
) {
    if failure.is_some() {
        drained(joined);
        return;
    }

    let result = match joined {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(error = %err, "worker task failed");
            *failure = Some(SyncError::Worker(err.to_string()));
            observer.state_changed(RunState::Aborted);
            return;
        }
    };

    observer.job_completed(&result);
    match result.error {
        None => summary.record(result.job.action()),
        Some(source) => {
            *failure = Some(SyncError::job(&result.job, source));
            observer.state_changed(RunState::Aborted);
        }
    }
}

/// Outcome of a job that was still in flight when the run aborted.
fn drained(joined: Result<JobResult, JoinError>) {
    match joined {
        Ok(JobResult { job, error: None }) => {
            tracing::debug!(remote = job.remote(), "in-flight job finished after abort");
        }
        Ok(JobResult {
            job,
            error: Some(source),
        }) => {
            tracing::debug!(
                remote = job.remote(),
                error = %source,
                "ignoring failure after abort",
            );
        }
        Err(err) => tracing::debug!(error = %err, "worker task failed after abort"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_pulls_out_single_invalidation() {
        let jobs = vec![
            Job::upload("a", "site/a"),
            Job::invalidate("/*"),
            Job::delete("site/old"),
        ];
        let (sync_jobs, invalidate) = partition(jobs).unwrap();
        assert_eq!(sync_jobs.len(), 2);
        assert!(sync_jobs.iter().all(|j| !j.is_invalidation()));
        assert_eq!(invalidate, Some(Job::invalidate("/*")));
    }

    #[test]
    fn partition_rejects_two_invalidations() {
        let err = partition(vec![Job::invalidate("/*"), Job::invalidate("/*")]).unwrap_err();
        assert!(matches!(err, SyncError::DuplicateInvalidation));
    }

    #[test]
    fn summary_counts_by_action() {
        let mut summary = ExecutionSummary::default();
        summary.record(JobAction::Upload);
        summary.record(JobAction::Upload);
        summary.record(JobAction::Delete);
        assert_eq!(
            summary,
            ExecutionSummary {
                uploaded: 2,
                redirected: 0,
                deleted: 1,
                invalidated: false,
            }
        );
    }
}
