use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{self, Instant};

use crate::error::JobError;
use crate::jobs::{Job, JobRef, JobState};

/// Job that runs once: optionally sleeps, then flags itself completed.
///
/// Records when its body started and finished, which makes it handy for
/// observing ordering between jobs.
pub struct OneShotJob {
    name: String,
    state: JobState,
    work: Duration,
    started_at: Mutex<Option<Instant>>,
    finished_at: Mutex<Option<Instant>>,
    done: watch::Sender<bool>,
}

impl OneShotJob {
    /// One-shot job planned at `planned`, requiring every job in `required`.
    pub fn new(name: impl Into<String>, planned: Option<Instant>, required: Vec<JobRef>) -> Self {
        Self {
            name: name.into(),
            state: JobState::with_required(planned, required),
            work: Duration::ZERO,
            started_at: Mutex::new(None),
            finished_at: Mutex::new(None),
            done: watch::channel(false).0,
        }
    }

    /// Sets how long the body sleeps.
    pub fn with_work(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    /// Sets the initial readiness flag.
    pub fn with_ready(mut self, ready: bool) -> Self {
        self.state = self.state.initially_ready(ready);
        self
    }

    /// `true` once the body has completed.
    pub fn is_completed(&self) -> bool {
        *self.done.borrow()
    }

    pub fn started_at(&self) -> Option<Instant> {
        *self.started_at.lock()
    }

    pub fn finished_at(&self) -> Option<Instant> {
        *self.finished_at.lock()
    }

    /// Waits until the body has completed.
    pub async fn wait_finished(&self) {
        let mut rx = self.done.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }
}

#[async_trait]
impl Job for OneShotJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    async fn run(&self) -> Result<(), JobError> {
        *self.started_at.lock() = Some(Instant::now());
        if !self.work.is_zero() {
            time::sleep(self.work).await;
        }
        *self.finished_at.lock() = Some(Instant::now());
        self.done.send_replace(true);
        Ok(())
    }

    fn describe(&self) -> String {
        if self.is_completed() {
            "One shot: completed".to_string()
        } else {
            "One shot: not completed".to_string()
        }
    }
}
