//! # Scheduler: registry, triggers, dispatch and rescheduling.
//!
//! The [`Scheduler`] owns the registry of schedule entries, arms one delayed
//! trigger per entry, dispatches eligible jobs to the worker pool and decides
//! after every run whether a job is re-armed, retired or kept.
//!
//! ## High-level architecture
//! ```text
//! register(job) ──► Structure lock ──► link successors ──► insert Entry ──► arm Trigger
//!
//! Trigger fires (planned time):   PendingTime → Checking ──► try_execute
//! Observer on_ready(true):                                ──► try_execute
//! Required job finished (reschedule of predecessor):      ──► try_execute
//!
//! try_execute(entry):
//!   ├─ status != Checking          → stop
//!   ├─ job not ready               → JobWaiting{not_ready}, stop
//!   ├─ a required job not Finished → JobWaiting{required_unfinished}, stop
//!   └─ CAS Checking → Running      → spawn run_body on the worker pool
//!
//! run_body ──► before_run / run / after_run ──► Finished ──► reschedule(entry):
//!   1. try_execute every successor (successor guard held)
//!   2. cancel the entry's trigger
//!   3. planned time set            → fresh Entry (PendingTime), arm, JobRearmed
//!   4. auto-retire, no successors  → remove, unlink, JobRetired
//!   5. otherwise                   → stays Finished, JobKept
//! ```
//!
//! ## Rules
//! - At most one execution per job: only the winner of `Checking → Running` spawns a body.
//! - A successor is only checked after its predecessor is observably `Finished`.
//! - Registry mutations never run while a job body executes; they only hold the
//!   structure lock for bookkeeping.
//! - The scheduler's observer is attached and detached under the structure lock,
//!   together with the entry it serves.
//! - A finished, non-recurring job that still has successors stays registered;
//!   the caller removes it once its successors are gone.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use jobvisor::{Scheduler, SchedulerConfig, samples::OneShotJob};
//! use tokio::time::Instant;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sched = Scheduler::builder(SchedulerConfig::default()).build();
//!
//!     let job = Arc::new(OneShotJob::new("hello", Some(Instant::now()), Vec::new()));
//!     assert!(sched.register(job.clone())?);
//!     assert!(!sched.register(job.clone())?);
//!
//!     job.wait_finished().await;
//!     sched.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Weak};

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::builder::SchedulerBuilder;
use super::config::SchedulerConfig;
use super::entry::{Entry, JobStatus};
use super::registry::{Registry, Structure};
use super::runner::run_body;
use super::shutdown;
use crate::error::{RuntimeError, ScheduleError};
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{Job, JobId, JobObserver, JobRef};
use crate::subscribers::SubscriberSet;

/// State shared by the scheduler handle, trigger tasks and workers.
pub(crate) struct Inner {
    pub(super) cfg: SchedulerConfig,
    pub(super) bus: Bus,
    pub(super) registry: Registry,
    pub(super) runtime: Handle,
    pub(super) token: CancellationToken,
    pub(super) tracker: TaskTracker,
    pub(super) semaphore: Option<Arc<Semaphore>>,
    observer: Arc<dyn JobObserver>,
}

/// Observer the scheduler registers on every job it holds.
struct SchedulerObserver {
    inner: Weak<Inner>,
}

impl JobObserver for SchedulerObserver {
    fn on_progress(&self, job: JobId, progress: i32) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if let Some(entry) = inner.registry.get(job) {
            entry.cache_progress(progress);
        }
    }

    fn on_ready(&self, job: JobId, ready: bool) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if let Some(entry) = inner.registry.get(job) {
            entry.cache_ready(ready);
            if ready {
                inner.try_execute(&entry);
            }
        }
    }
}

impl Inner {
    pub(super) fn new(
        cfg: SchedulerConfig,
        bus: Bus,
        runtime: Handle,
        semaphore: Option<Arc<Semaphore>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Inner {
            cfg,
            bus,
            registry: Registry::new(),
            runtime,
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            semaphore,
            observer: Arc::new(SchedulerObserver {
                inner: weak.clone(),
            }),
        })
    }

    /// Arms `entry`'s trigger for `at`.
    fn arm(self: &Arc<Self>, entry: &Arc<Entry>, at: Instant) {
        let weak = Arc::downgrade(self);
        let fired = Arc::clone(entry);
        entry.trigger().arm(&self.runtime, at, move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_trigger(&fired);
            }
        });
    }

    fn on_trigger(self: &Arc<Self>, entry: &Arc<Entry>) {
        if !entry.transition(JobStatus::PendingTime, JobStatus::Checking) {
            return;
        }
        self.bus
            .publish(Event::new(EventKind::TriggerFired).with_job(entry.job().name()));
        self.try_execute(entry);
    }

    /// Eligibility check. Dispatches the job if it is checking, ready, and every
    /// job it requires has finished.
    pub(super) fn try_execute(self: &Arc<Self>, entry: &Arc<Entry>) {
        if entry.status() != JobStatus::Checking || self.token.is_cancelled() {
            return;
        }
        let job = entry.job();

        let ready = job.ready_status();
        entry.cache_ready(ready);
        if !ready {
            self.publish_waiting(job.name(), "not_ready");
            return;
        }

        let unfinished = job.required_jobs().iter().any(|req| {
            self.registry
                .get(req.id())
                .is_none_or(|e| e.status() != JobStatus::Finished)
        });
        if unfinished {
            self.publish_waiting(job.name(), "required_unfinished");
            return;
        }

        if !entry.transition(JobStatus::Checking, JobStatus::Running) {
            return;
        }
        self.tracker
            .spawn_on(run_body(Arc::clone(self), Arc::clone(entry)), &self.runtime);
    }

    fn publish_waiting(&self, job: &str, reason: &'static str) {
        self.bus.publish(
            Event::new(EventKind::JobWaiting)
                .with_job(job)
                .with_reason(reason),
        );
    }

    /// Completion step, run once by the worker after `entry` reached `Finished`.
    pub(super) fn reschedule(self: &Arc<Self>, entry: &Arc<Entry>) {
        {
            let successors = entry.successors();
            for succ in successors.values() {
                if let Some(succ_entry) = self.registry.get(succ.id()) {
                    self.try_execute(&succ_entry);
                }
            }
        }
        entry.trigger().cancel();

        let structure = self.registry.structure();
        if !structure.is_current(entry) {
            // Unregistered while finishing.
            return;
        }
        let job = Arc::clone(entry.job());
        let runs = entry.runs();

        if let Some(at) = job.planned_time() {
            let fresh = Arc::new(Entry::rearmed(entry, &self.token));
            structure.insert(Arc::clone(&fresh));
            drop(structure);
            self.arm(&fresh, at);
            self.bus.publish(
                Event::new(EventKind::JobRearmed)
                    .with_job(job.name())
                    .with_run(runs)
                    .with_delay(at.saturating_duration_since(Instant::now())),
            );
            return;
        }

        let kept = if !job.auto_retire() {
            Some("auto_retire_disabled")
        } else if entry.has_successors() {
            Some("has_successors")
        } else {
            None
        };
        if let Some(reason) = kept {
            drop(structure);
            self.bus.publish(
                Event::new(EventKind::JobKept)
                    .with_job(job.name())
                    .with_reason(reason),
            );
            return;
        }

        match self.detach(&structure, job.as_ref()) {
            Ok(()) => {
                job.remove_observer(&self.observer);
                drop(structure);
                self.bus.publish(
                    Event::new(EventKind::JobRetired)
                        .with_job(job.name())
                        .with_run(runs),
                );
                tracing::debug!(job = job.name(), runs, "job retired");
            }
            Err(err) => {
                tracing::error!(?entry, label = err.as_label(), "{}", err.as_message());
            }
        }
    }

    /// Removes `job`'s entry and unlinks it from the jobs it requires.
    ///
    /// Validates before mutating: a missing required entry leaves the registry untouched.
    fn detach(&self, structure: &Structure<'_>, job: &dyn Job) -> Result<(), ScheduleError> {
        let required = structure
            .required_entries(job)
            .map_err(|missing| ScheduleError::InvariantViolated {
                detail: format!(
                    "job '{}' is registered but its required job '{missing}' is not",
                    job.name()
                ),
            })?;
        if let Some(entry) = structure.remove(job.id()) {
            entry.trigger().cancel();
        }
        structure.unlink(&required, job.id());
        Ok(())
    }
}

/// Schedules jobs gated by planned time, required jobs and readiness.
///
/// Create it with [`Scheduler::builder`] inside a Tokio runtime.
pub struct Scheduler {
    inner: Arc<Inner>,
    subs: Arc<SubscriberSet>,
}

impl Scheduler {
    /// Returns a builder for a scheduler with the given configuration.
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    pub(super) fn new_internal(inner: Arc<Inner>, subs: Arc<SubscriberSet>) -> Self {
        Self { inner, subs }
    }

    /// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
    pub(super) fn subscriber_listener(&self) {
        if self.subs.is_empty() {
            return;
        }
        let mut rx = self.inner.bus.subscribe();
        let set = Arc::clone(&self.subs);
        self.inner.runtime.spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Registers a job.
    ///
    /// Returns `Ok(false)` if the job is already registered. Otherwise links it as a
    /// successor of every job it requires, subscribes to its progress and readiness,
    /// and arms a trigger for its planned time.
    ///
    /// ### Errors
    /// - [`ScheduleError::InvalidSchedule`] if the planned time is "never" or a required
    ///   job is not registered.
    /// - [`ScheduleError::Closed`] after [`shutdown`](Scheduler::shutdown).
    pub fn register(&self, job: JobRef) -> Result<bool, ScheduleError> {
        let Some(at) = job.planned_time() else {
            return Err(ScheduleError::InvalidSchedule {
                job: job.name().to_string(),
                reason: "planned time is never".to_string(),
            });
        };
        if self.inner.token.is_cancelled() {
            return Err(ScheduleError::Closed);
        }

        let structure = self.inner.registry.structure();
        if structure.contains(job.id()) {
            return Ok(false);
        }
        let required = structure.required_entries(job.as_ref()).map_err(|missing| {
            ScheduleError::InvalidSchedule {
                job: job.name().to_string(),
                reason: format!("required job '{missing}' is not registered"),
            }
        })?;

        structure.link(&required, &job);
        job.add_observer(&self.inner.observer);
        let entry = Arc::new(Entry::new(Arc::clone(&job), &self.inner.token));
        structure.insert(Arc::clone(&entry));
        drop(structure);

        self.inner.arm(&entry, at);
        self.inner.bus.publish(
            Event::new(EventKind::JobRegistered)
                .with_job(job.name())
                .with_delay(at.saturating_duration_since(Instant::now())),
        );
        tracing::debug!(job = job.name(), id = %job.id(), "job registered");
        Ok(true)
    }

    /// Removes a job.
    ///
    /// Returns `Ok(false)` if the job is not registered. On success the job's pending
    /// trigger is cancelled and it will not start again under this registration.
    ///
    /// ### Errors
    /// - [`ScheduleError::JobBusy`] if the job body is executing.
    /// - [`ScheduleError::JobRequired`] if registered jobs still require it.
    pub fn unregister(&self, job: &dyn Job) -> Result<bool, ScheduleError> {
        let structure = self.inner.registry.structure();
        let Some(entry) = structure.get(job.id()) else {
            return Ok(false);
        };
        let busy = || ScheduleError::JobBusy {
            job: job.name().to_string(),
        };
        if entry.status() == JobStatus::Running {
            return Err(busy());
        }
        let successors = entry.successor_names();
        if !successors.is_empty() {
            return Err(ScheduleError::JobRequired {
                job: job.name().to_string(),
                successors,
            });
        }
        entry.retire().map_err(|_| busy())?;

        if let Err(err) = self.inner.detach(&structure, job) {
            tracing::error!(job = job.name(), label = err.as_label(), "{}", err.as_message());
            return Err(err);
        }
        job.remove_observer(&self.inner.observer);
        drop(structure);

        self.inner
            .bus
            .publish(Event::new(EventKind::JobUnregistered).with_job(job.name()));
        tracing::debug!(job = job.name(), "job unregistered");
        Ok(true)
    }

    /// Snapshot of the registered jobs, in registration order of their identities.
    pub fn scheduled_jobs(&self) -> Vec<JobRef> {
        self.inner.registry.jobs()
    }

    /// `true` if the job is registered.
    pub fn contains(&self, job: &dyn Job) -> bool {
        self.inner.registry.contains(job.id())
    }

    /// Current status of the job's entry, `None` if it is not registered.
    pub fn status(&self, job: &dyn Job) -> Option<JobStatus> {
        self.inner.registry.get(job.id()).map(|e| e.status())
    }

    /// Last progress reported by the job, `None` if it is not registered.
    pub fn job_progress(&self, job: &dyn Job) -> Option<i32> {
        self.inner.registry.get(job.id()).map(|e| e.cached_progress())
    }

    /// Number of completed or started runs of the job under its current registration.
    pub fn runs(&self, job: &dyn Job) -> Option<u32> {
        self.inner.registry.get(job.id()).map(|e| e.runs())
    }

    /// Subscribes to the runtime event bus.
    pub fn events(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// `true` once [`shutdown`](Scheduler::shutdown) has been requested.
    pub fn is_closed(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Stops the scheduler.
    ///
    /// Cancels every trigger, stops dispatching, then waits up to
    /// [`SchedulerConfig::grace`] for running job bodies.
    ///
    /// ### Errors
    /// [`RuntimeError::GraceExceeded`] with the names of the jobs still running.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.inner
            .bus
            .publish(Event::new(EventKind::ShutdownRequested));
        self.inner.token.cancel();
        self.inner.tracker.close();

        let grace = self.inner.cfg.grace;
        match time::timeout(grace, self.inner.tracker.wait()).await {
            Ok(()) => {
                self.inner.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.inner.bus.publish(Event::new(EventKind::GraceExceeded));
                let stuck: Vec<String> = self
                    .inner
                    .registry
                    .entries()
                    .iter()
                    .filter(|e| e.status() == JobStatus::Running)
                    .map(|e| e.job().name().to_string())
                    .collect();
                tracing::warn!(?grace, ?stuck, "shutdown grace exceeded");
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Waits for a termination signal, then calls [`shutdown`](Scheduler::shutdown).
    pub async fn run_until_shutdown_signal(&self) -> Result<(), RuntimeError> {
        match shutdown::wait_for_shutdown_signal().await {
            Ok(signal) => tracing::info!(signal, "termination signal received"),
            Err(err) => tracing::warn!(error = %err, "signal handler unavailable, shutting down"),
        }
        self.shutdown().await
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.inner.token.cancel();
    }
}
