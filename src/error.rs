//! Error types used by the jobvisor scheduler and by job bodies.
//!
//! This module defines three error enums:
//!
//! - [`ScheduleError`]: registry operations refused by the scheduler (`register`/`unregister`).
//! - [`JobError`]: failures of an individual job body.
//! - [`RuntimeError`]: errors raised by the runtime itself (shutdown).
//!
//! All of them provide `as_label` (stable snake_case, for logs/metrics) and
//! `as_message` (human-readable details).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by registry operations.
///
/// Duplicate registration is **not** an error: [`Scheduler::register`](crate::Scheduler::register)
/// reports it with `Ok(false)`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The job can never run under this scheduler: its planned time is "never",
    /// or one of its required jobs is not registered.
    ///
    /// Not retried automatically; fix the job and register again.
    #[error("invalid schedule for job '{job}': {reason}")]
    InvalidSchedule {
        /// Name of the rejected job.
        job: String,
        /// Why the job was rejected.
        reason: String,
    },

    /// Removal refused because the job body is executing right now.
    ///
    /// The caller may retry once the run has completed.
    #[error("job '{job}' is running")]
    JobBusy {
        /// Name of the running job.
        job: String,
    },

    /// Removal refused because other registered jobs require this one.
    ///
    /// Remove the dependents first.
    #[error("job '{job}' is required by {successors:?}")]
    JobRequired {
        /// Name of the required job.
        job: String,
        /// Names of the registered jobs depending on it.
        successors: Vec<String>,
    },

    /// The scheduler has been shut down and accepts no new jobs.
    #[error("scheduler is shut down")]
    Closed,

    /// Internal registry invariant was found broken.
    ///
    /// Never expected in correct operation; indicates a bug in the scheduler.
    #[error("registry invariant violated: {detail}")]
    InvariantViolated {
        /// Diagnostic describing the broken invariant.
        detail: String,
    },
}

impl ScheduleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobvisor::ScheduleError;
    ///
    /// let err = ScheduleError::JobBusy { job: "report".into() };
    /// assert_eq!(err.as_label(), "job_busy");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScheduleError::InvalidSchedule { .. } => "invalid_schedule",
            ScheduleError::JobBusy { .. } => "job_busy",
            ScheduleError::JobRequired { .. } => "job_required",
            ScheduleError::Closed => "scheduler_closed",
            ScheduleError::InvariantViolated { .. } => "invariant_violated",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ScheduleError::InvalidSchedule { job, reason } => {
                format!("job={job} rejected: {reason}")
            }
            ScheduleError::JobBusy { job } => format!("job={job} is running"),
            ScheduleError::JobRequired { job, successors } => {
                format!("job={job} required by {}", successors.join(","))
            }
            ScheduleError::Closed => "scheduler closed".to_string(),
            ScheduleError::InvariantViolated { detail } => format!("invariant: {detail}"),
        }
    }
}

/// # Errors produced by a job body.
///
/// A failing body does not change scheduling: the engine still calls
/// [`Job::after_run`](crate::Job::after_run), marks the run finished and reschedules.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The body reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The body panicked; the panic was caught by the worker.
    #[error("job panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl JobError {
    /// Shorthand for [`JobError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        JobError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobvisor::JobError;
    ///
    /// assert_eq!(JobError::fail("disk full").as_label(), "job_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Fail { .. } => "job_failed",
            JobError::Panicked { .. } => "job_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            JobError::Fail { error } => format!("error: {error}"),
            JobError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Errors produced by the jobvisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some job bodies were still running.
    #[error("shutdown timeout {grace:?} exceeded; still running: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the jobs whose bodies did not finish in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; running jobs={stuck:?}")
            }
        }
    }
}
