//! # Schedule entry: the engine's record for one registered job.
//!
//! ```text
//! PendingTime ──(trigger fired)──► Checking ──(ready ∧ required finished)──► Running
//!                                    ▲   │                                     │
//!                                    └───┘ (deferred; woken externally)        ▼
//!                                                                          Finished
//!                                          (re-armed: replaced by a fresh PendingTime entry)
//! ```
//!
//! ## Rules
//! - `status` changes only through compare-and-swap, so exactly one of several
//!   racing eligibility checks wins `Checking → Running`.
//! - `successors` is mutated only while the registry structure lock is held; the
//!   reschedule step iterates it under its own guard.
//! - Cached readiness and progress are advisory; the job itself is authoritative.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicU32, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use super::trigger::Trigger;
use crate::jobs::{JobId, JobRef};

/// State-machine status of a registered job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JobStatus {
    /// Waiting for the planned time.
    PendingTime = 0,
    /// Planned time reached; waiting for readiness and required jobs.
    Checking = 1,
    /// Dispatched to the worker pool (possibly still waiting for a free worker).
    Running = 2,
    /// Body and hooks completed for this entry.
    Finished = 3,
}

impl JobStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => JobStatus::PendingTime,
            1 => JobStatus::Checking,
            2 => JobStatus::Running,
            _ => JobStatus::Finished,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobStatus::PendingTime => "pending_time",
            JobStatus::Checking => "checking",
            JobStatus::Running => "running",
            JobStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

pub(crate) struct Entry {
    job: JobRef,
    status: AtomicU8,
    cached_ready: AtomicBool,
    cached_progress: AtomicI32,
    successors: Mutex<HashMap<JobId, JobRef>>,
    runs: AtomicU32,
    trigger: Trigger,
}

impl Entry {
    /// Fresh entry for a newly registered job.
    pub(crate) fn new(job: JobRef, runtime: &CancellationToken) -> Self {
        Self {
            status: AtomicU8::new(JobStatus::PendingTime as u8),
            cached_ready: AtomicBool::new(job.ready_status()),
            cached_progress: AtomicI32::new(job.progress()),
            successors: Mutex::new(HashMap::new()),
            runs: AtomicU32::new(0),
            trigger: Trigger::new(runtime),
            job,
        }
    }

    /// Fresh entry replacing `prev` for the next run.
    ///
    /// Successors, cached values and the run counter carry over.
    pub(crate) fn rearmed(prev: &Entry, runtime: &CancellationToken) -> Self {
        Self {
            job: prev.job.clone(),
            status: AtomicU8::new(JobStatus::PendingTime as u8),
            cached_ready: AtomicBool::new(prev.cached_ready()),
            cached_progress: AtomicI32::new(prev.cached_progress()),
            successors: Mutex::new(prev.successors.lock().clone()),
            runs: AtomicU32::new(prev.runs()),
            trigger: Trigger::new(runtime),
        }
    }

    pub(crate) fn job(&self) -> &JobRef {
        &self.job
    }

    pub(crate) fn status(&self) -> JobStatus {
        JobStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn set_status(&self, to: JobStatus) {
        self.status.store(to as u8, Ordering::Release);
    }

    /// Atomically moves `from → to`; `false` if the status was not `from`.
    pub(crate) fn transition(&self, from: JobStatus, to: JobStatus) -> bool {
        self.status
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Marks the entry finished unless it is running, so no later check can start it.
    ///
    /// Returns `Err(Running)` when the job body is executing.
    pub(crate) fn retire(&self) -> Result<(), JobStatus> {
        let mut current = self.status.load(Ordering::Acquire);
        loop {
            if JobStatus::from_u8(current) == JobStatus::Running {
                return Err(JobStatus::Running);
            }
            match self.status.compare_exchange(
                current,
                JobStatus::Finished as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    pub(crate) fn cached_ready(&self) -> bool {
        self.cached_ready.load(Ordering::Acquire)
    }

    pub(crate) fn cache_ready(&self, ready: bool) {
        self.cached_ready.store(ready, Ordering::Release);
    }

    pub(crate) fn cached_progress(&self) -> i32 {
        self.cached_progress.load(Ordering::Acquire)
    }

    pub(crate) fn cache_progress(&self, progress: i32) {
        self.cached_progress.store(progress, Ordering::Release);
    }

    /// Starts a new run and returns its 1-based number.
    pub(crate) fn next_run(&self) -> u32 {
        self.runs.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    pub(crate) fn runs(&self) -> u32 {
        self.runs.load(Ordering::Acquire)
    }

    pub(crate) fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Guard over the successor set. Hold it only for bookkeeping or iteration,
    /// never while taking the registry structure lock.
    pub(crate) fn successors(&self) -> MutexGuard<'_, HashMap<JobId, JobRef>> {
        self.successors.lock()
    }

    pub(crate) fn has_successors(&self) -> bool {
        !self.successors.lock().is_empty()
    }

    /// Sorted names of the registered successors.
    pub(crate) fn successor_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .successors
            .lock()
            .values()
            .map(|j| j.name().to_string())
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("job", &self.job.name())
            .field("status", &self.status())
            .field("ready", &self.cached_ready())
            .field("progress", &self.cached_progress())
            .field("runs", &self.runs())
            .finish()
    }
}
