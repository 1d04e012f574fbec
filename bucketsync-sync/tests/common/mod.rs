//! Recording doubles shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use bucketsync_core::{Job, RunState};
use bucketsync_store::{RemoteError, RemoteStore};
use bucketsync_sync::{JobResult, SyncObserver};

/// A store call, logged when it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload { local: String, key: String },
    Redirect { source: String, target: String },
    Delete { key: String },
    Invalidate { pattern: String },
}

/// In-memory store that records calls and tracks how many overlap.
#[derive(Debug, Default)]
pub struct RecordingStore {
    listing: Vec<String>,
    /// Key whose upload/redirect/delete fails, without waiting out `delay`.
    fail_on: Option<String>,
    fail_invalidate: bool,
    fail_list: bool,
    delay: Duration,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    in_flight_at_invalidate: Mutex<Option<usize>>,
    list_calls: AtomicUsize,
}

impl RecordingStore {
    pub fn with_delay(delay: Duration) -> Self {
        Self::default().delayed(delay)
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn listing(mut self, keys: &[&str]) -> Self {
        self.listing = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn failing_on(mut self, key: impl Into<String>) -> Self {
        self.fail_on = Some(key.into());
        self
    }

    pub fn failing_invalidate(mut self) -> Self {
        self.fail_invalidate = true;
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn invalidated(&self) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c, Call::Invalidate { .. }))
    }

    pub fn in_flight_at_invalidate(&self) -> Option<usize> {
        *self.in_flight_at_invalidate.lock().unwrap()
    }

    async fn track(&self, key: &str, call: Call) -> Result<(), RemoteError> {
        let fails = self.fail_on.as_deref() == Some(key);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !fails && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);

        if fails {
            return Err(RemoteError::Rejected {
                op: "write",
                key: key.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for RecordingStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(RemoteError::Rejected {
                op: "list",
                key: prefix.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(self.listing.clone())
    }

    async fn upload(&self, local: &Path, key: &str) -> Result<(), RemoteError> {
        let call = Call::Upload {
            local: local.to_string_lossy().into_owned(),
            key: key.to_string(),
        };
        self.track(key, call).await
    }

    async fn redirect(&self, source_key: &str, target: &str) -> Result<(), RemoteError> {
        let call = Call::Redirect {
            source: source_key.to_string(),
            target: target.to_string(),
        };
        self.track(source_key, call).await
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteError> {
        let call = Call::Delete {
            key: key.to_string(),
        };
        self.track(key, call).await
    }

    async fn invalidate(&self, pattern: &str) -> Result<(), RemoteError> {
        *self.in_flight_at_invalidate.lock().unwrap() =
            Some(self.in_flight.load(Ordering::SeqCst));
        self.calls.lock().unwrap().push(Call::Invalidate {
            pattern: pattern.to_string(),
        });
        if self.fail_invalidate {
            return Err(RemoteError::Rejected {
                op: "invalidate",
                key: pattern.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Observer that keeps every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    states: Mutex<Vec<RunState>>,
    dispatched: Mutex<Vec<Job>>,
    completed: AtomicUsize,
    failed: AtomicUsize,
    matched: Mutex<Vec<String>>,
    unmatched: Mutex<Vec<String>>,
    outside: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn states(&self) -> Vec<RunState> {
        self.states.lock().unwrap().clone()
    }

    pub fn last_state(&self) -> Option<RunState> {
        self.states().last().copied()
    }

    pub fn dispatched(&self) -> Vec<Job> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn matched(&self) -> Vec<String> {
        self.matched.lock().unwrap().clone()
    }

    pub fn unmatched(&self) -> Vec<String> {
        self.unmatched.lock().unwrap().clone()
    }

    pub fn outside(&self) -> Vec<String> {
        self.outside.lock().unwrap().clone()
    }
}

impl SyncObserver for RecordingObserver {
    fn state_changed(&self, state: RunState) {
        self.states.lock().unwrap().push(state);
    }

    fn delete_candidate(&self, remote: &str, _key: &str, matched: bool) {
        let list = if matched { &self.matched } else { &self.unmatched };
        list.lock().unwrap().push(remote.to_string());
    }

    fn remote_outside_prefix(&self, remote: &str, _prefix: &str) {
        self.outside.lock().unwrap().push(remote.to_string());
    }

    fn job_dispatched(&self, job: &Job) {
        self.dispatched.lock().unwrap().push(job.clone());
    }

    fn job_completed(&self, result: &JobResult) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        if !result.is_ok() {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// `count` uploads with keys `k1..=kcount`.
pub fn uploads(count: usize) -> Vec<Job> {
    (1..=count)
        .map(|i| Job::upload(format!("/src/f{i}"), format!("k{i}")))
        .collect()
}
