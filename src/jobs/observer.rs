//! # Observer protocol between a job and its listeners.
//!
//! A job broadcasts two kinds of transitions to every registered [`JobObserver`]:
//! progress changes and readiness changes. The scheduler is always one of the
//! observers of a registered job; sample jobs use the same protocol to watch each
//! other (see [`AlternatingJob`](crate::samples::AlternatingJob)).
//!
//! ## Rules
//! - Callbacks are **synchronous** and run on whichever thread changed the value,
//!   before the changing call returns.
//! - Ordering across observers is unspecified; all of them see the same value.
//! - Callbacks must not block: they run inside the job's own execution.

use super::state::JobId;

/// Listener of job progress and readiness transitions.
pub trait JobObserver: Send + Sync + 'static {
    /// Called after `job` changed its progress to `progress`.
    fn on_progress(&self, job: JobId, progress: i32);

    /// Called after `job` changed its readiness flag to `ready`.
    fn on_ready(&self, job: JobId, ready: bool);
}
