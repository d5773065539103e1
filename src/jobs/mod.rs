//! # Job contract.
//!
//! This module provides the job-side types:
//! - [`Job`] - trait for gated, observable units of work
//! - [`JobRef`] - shared reference to a job (`Arc<dyn Job>`)
//! - [`JobState`] - composable scheduling metadata (prerequisites, time, readiness, progress)
//! - [`JobId`] - job identity
//! - [`JobObserver`] - progress/readiness listener

mod job;
mod observer;
mod state;

pub use job::{Job, JobRef, PROGRESS_FINISHED, PROGRESS_NOT_STARTED, PROGRESS_STARTED};
pub use observer::JobObserver;
pub use state::{JobId, JobState};
