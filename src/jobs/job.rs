//! # Job abstraction
//!
//! A [`Job`] is a unit of work gated by three independent conditions:
//! its planned time is reached, every required job has finished, and its own
//! readiness flag is `true`. The scheduler only ever touches a job through this
//! trait; the common handle type is [`JobRef`] (`Arc<dyn Job>`).
//!
//! Implementors supply a name, the async body and a composed [`JobState`]; every
//! other contract operation has a provided default that delegates to the state.
//! Periodic jobs override [`Job::after_run`] to re-arm themselves.
//!
//! # Example
//! ```
//! use async_trait::async_trait;
//! use jobvisor::{Job, JobError, JobState};
//! use tokio::time::Instant;
//!
//! struct Hello {
//!     state: JobState,
//! }
//!
//! #[async_trait]
//! impl Job for Hello {
//!     fn name(&self) -> &str { "hello" }
//!     fn state(&self) -> &JobState { &self.state }
//!
//!     async fn run(&self) -> Result<(), JobError> {
//!         // do work...
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let job = Hello { state: JobState::new(Some(Instant::now())) };
//! assert!(!job.is_started());
//! job.before_run();
//! assert!(job.is_started());
//! job.after_run();
//! assert!(job.is_finished());
//! assert!(job.planned_time().is_none());
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;

use super::observer::JobObserver;
use super::state::{JobId, JobState};
use crate::error::JobError;

/// Progress of a job that has not started yet (or waits for its next run).
pub const PROGRESS_NOT_STARTED: i32 = -1;
/// Progress of a job that has just started.
pub const PROGRESS_STARTED: i32 = 0;
/// Default maximum progress: a job with this progress is finished.
pub const PROGRESS_FINISHED: i32 = 1000;

/// Shared handle to a job.
pub type JobRef = Arc<dyn Job>;

/// # Gated, observable unit of work.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Human-readable job name (for logs, events and errors).
    fn name(&self) -> &str;

    /// Composed scheduling metadata.
    fn state(&self) -> &JobState;

    /// The job body. Invoked by the scheduler between [`before_run`](Job::before_run)
    /// and [`after_run`](Job::after_run); may sleep or take long, it only occupies
    /// one worker slot.
    async fn run(&self) -> Result<(), JobError>;

    /// Identity of this job.
    fn id(&self) -> JobId {
        self.state().id()
    }

    /// Jobs that must finish before this job may run. Never contains the job itself.
    fn required_jobs(&self) -> &[JobRef] {
        self.state().required_jobs()
    }

    /// Next eligible instant, `None` if the job must not run again.
    fn planned_time(&self) -> Option<Instant> {
        self.state().planned_time()
    }

    /// Readiness flag. Only authoritative once the time and prerequisite gates are open.
    fn ready_status(&self) -> bool {
        self.state().ready()
    }

    fn progress(&self) -> i32 {
        self.state().progress()
    }

    fn max_progress(&self) -> i32 {
        PROGRESS_FINISHED
    }

    /// `true` once progress is non-negative.
    fn is_started(&self) -> bool {
        self.progress() >= PROGRESS_STARTED
    }

    /// `true` when progress equals [`max_progress`](Job::max_progress).
    fn is_finished(&self) -> bool {
        self.progress() == self.max_progress()
    }

    /// Whether the scheduler may drop the job after its last run.
    ///
    /// Consulted only when the job will not run again; a job that still has
    /// registered successors is never retired.
    fn auto_retire(&self) -> bool {
        true
    }

    /// Called by the scheduler right before [`run`](Job::run).
    fn before_run(&self) {
        self.state().set_progress(PROGRESS_STARTED);
    }

    /// Called by the scheduler right after [`run`](Job::run), whatever its outcome.
    ///
    /// Marks the job finished and clears the planned time. Recurring jobs
    /// override this to set a future planned time.
    fn after_run(&self) {
        self.state().set_progress(self.max_progress());
        self.state().set_planned_time(None);
    }

    /// Registers an observer; `false` if it was already registered.
    fn add_observer(&self, observer: &Arc<dyn JobObserver>) -> bool {
        self.state().add_observer(observer)
    }

    /// Unregisters an observer; `false` if it was not registered.
    fn remove_observer(&self, observer: &Arc<dyn JobObserver>) -> bool {
        self.state().remove_observer(observer)
    }

    /// One-line status text for presentation layers.
    fn describe(&self) -> String {
        self.name().to_string()
    }
}
