//! # Shared job state
//!
//! [`JobState`] holds the scheduling metadata every job carries (identity,
//! prerequisites, planned time, readiness, progress, observers). Concrete jobs
//! compose one `JobState` and expose it through [`Job::state`](crate::Job::state);
//! the provided methods of [`Job`](crate::Job) delegate here.
//!
//! ## Rules
//! - `required` is fixed at construction and never changes.
//! - `set_progress` / `set_ready` broadcast synchronously to all live observers
//!   before returning.
//! - Observers are held **weakly**: a job never keeps its listeners alive, so two
//!   jobs observing each other do not leak.
//! - Broadcast iterates a snapshot, so observers may be added or removed
//!   concurrently with (or from within) a broadcast.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;

use super::job::{JobRef, PROGRESS_NOT_STARTED};
use super::observer::JobObserver;

/// Global counter for job identities.
static JOB_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identity of a job.
///
/// Allocated once per [`JobState`], so two distinct job objects never share an id
/// and the id of one object never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    fn next() -> Self {
        JobId(JOB_SEQ.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// Scheduling metadata of one job.
pub struct JobState {
    id: JobId,
    required: Vec<JobRef>,
    planned: Mutex<Option<Instant>>,
    ready: AtomicBool,
    progress: AtomicI32,
    observers: RwLock<Vec<Weak<dyn JobObserver>>>,
}

impl JobState {
    /// State of a job without prerequisites, first eligible at `planned`.
    ///
    /// Readiness starts `true`, progress starts at [`PROGRESS_NOT_STARTED`].
    pub fn new(planned: Option<Instant>) -> Self {
        Self::with_required(planned, Vec::new())
    }

    /// State of a job that may only run after every job in `required` has finished.
    ///
    /// Duplicates in `required` are dropped.
    pub fn with_required(planned: Option<Instant>, required: Vec<JobRef>) -> Self {
        let mut unique: Vec<JobRef> = Vec::with_capacity(required.len());
        for job in required {
            if !unique.iter().any(|j| j.id() == job.id()) {
                unique.push(job);
            }
        }
        Self {
            id: JobId::next(),
            required: unique,
            planned: Mutex::new(planned),
            ready: AtomicBool::new(true),
            progress: AtomicI32::new(PROGRESS_NOT_STARTED),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Sets the initial readiness flag (no broadcast: nobody observes yet).
    pub fn initially_ready(self, ready: bool) -> Self {
        self.ready.store(ready, Ordering::Release);
        self
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn required_jobs(&self) -> &[JobRef] {
        &self.required
    }

    pub fn planned_time(&self) -> Option<Instant> {
        *self.planned.lock()
    }

    /// Changes the next eligible instant; `None` means "never again".
    pub fn set_planned_time(&self, planned: Option<Instant>) {
        *self.planned.lock() = planned;
    }

    pub fn ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Changes readiness and notifies every observer.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
        for observer in self.live_observers() {
            observer.on_ready(self.id, ready);
        }
    }

    pub fn progress(&self) -> i32 {
        self.progress.load(Ordering::Acquire)
    }

    /// Changes progress and notifies every observer.
    pub fn set_progress(&self, progress: i32) {
        self.progress.store(progress, Ordering::Release);
        for observer in self.live_observers() {
            observer.on_progress(self.id, progress);
        }
    }

    /// Registers an observer. Returns `false` if it is already registered.
    pub fn add_observer(&self, observer: &Arc<dyn JobObserver>) -> bool {
        let mut observers = self.observers.write();
        observers.retain(|w| w.strong_count() > 0);
        if observers.iter().any(|w| same_observer(w, observer)) {
            return false;
        }
        observers.push(Arc::downgrade(observer));
        true
    }

    /// Unregisters an observer. Returns `false` if it was not registered.
    pub fn remove_observer(&self, observer: &Arc<dyn JobObserver>) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|w| w.strong_count() > 0 && !same_observer(w, observer));
        observers.len() != before
    }

    fn live_observers(&self) -> Vec<Arc<dyn JobObserver>> {
        self.observers
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

impl fmt::Debug for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobState")
            .field("id", &self.id)
            .field("required", &self.required.len())
            .field("ready", &self.ready())
            .field("progress", &self.progress())
            .finish()
    }
}

/// Compares data pointers only (vtable pointers may differ across codegen units).
fn same_observer(weak: &Weak<dyn JobObserver>, strong: &Arc<dyn JobObserver>) -> bool {
    std::ptr::eq(weak.as_ptr() as *const (), Arc::as_ptr(strong) as *const ())
}
