//! # jobvisor
//!
//! **Jobvisor** schedules async jobs that may run only when three independent
//! gates are open: their planned time has come, every job they require has
//! finished, and their own readiness flag is `true`.
//!
//! The scheduler keeps a live dependency graph of registered jobs, serializes
//! structural changes to it, runs at most one body per job at a time and lets
//! independent jobs run in parallel on a bounded worker pool.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Job A    │◄──┤     Job B    │   │     Job C    │   (B requires A)
//!     │  JobState    │   │  JobState    │   │  JobState    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ register         │ register         │ register
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler                                                        │
//! │  - Registry (Entry per job: status, successors, cached values)    │
//! │  - Trigger per entry (sleep_until planned time, cancellable)      │
//! │  - SchedulerObserver (on_progress / on_ready from every job)      │
//! │  - Worker pool (TaskTracker + optional Semaphore)                 │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        │ publishes        │                  │
//!        ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: SchedulerConfig::bus_capacity)            │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌────────┼────────┐
//!                          ▼        ▼        ▼
//!                       worker1  worker2  workerN
//! ```
//!
//! ### Lifecycle of one entry
//! ```text
//! register ──► PendingTime ──(trigger)──► Checking ──(ready ∧ required Finished)──► Running
//!                                            ▲  │ (deferred until a wake-up:
//!                                            └──┘  readiness true / required job finished)
//!
//! Running ──► before_run ─► run ─► after_run ──► Finished ──► reschedule:
//!   ├─ wake successors
//!   ├─ planned time set            ─► fresh PendingTime entry (JobRearmed)
//!   ├─ auto-retire, no successors  ─► removed (JobRetired)
//!   └─ otherwise                   ─► stays Finished until unregistered (JobKept)
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------------|--------------------------------------------|
//! | **Jobs**          | Gated, observable units of work and their shared state.            | [`Job`], [`JobState`], [`JobObserver`]     |
//! | **Scheduling**    | Register, remove and inspect jobs; graceful shutdown.              | [`Scheduler`], [`JobStatus`]               |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, custom subscribers).   | [`Subscribe`], [`Event`], [`EventKind`]    |
//! | **Errors**        | Typed errors for registry operations, job bodies and the runtime.  | [`ScheduleError`], [`JobError`], [`RuntimeError`] |
//! | **Configuration** | Centralize runtime settings.                                       | [`SchedulerConfig`]                        |
//! | **Samples**       | Ready-made one-shot, periodic, staged, prime and ping-pong jobs.   | [`samples`]                                |
//! | **Catalog**       | Named jobs with a one-line status per job.                         | [`JobCatalog`]                             |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber rendering events as `tracing` records.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use jobvisor::{JobRef, Scheduler, SchedulerConfig, samples::OneShotJob};
//! use tokio::time::Instant;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SchedulerConfig::default();
//!     cfg.max_workers = 2;
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn jobvisor::Subscribe>> = vec![Arc::new(jobvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn jobvisor::Subscribe>> = Vec::new();
//!
//!     let sched = Scheduler::builder(cfg).with_subscribers(subs).build();
//!
//!     // `fetch` runs first, `report` only once `fetch` has finished.
//!     let fetch = Arc::new(
//!         OneShotJob::new("fetch", Some(Instant::now()), Vec::new())
//!             .with_work(Duration::from_millis(20)),
//!     );
//!     let required: Vec<JobRef> = vec![fetch.clone()];
//!     let report = Arc::new(OneShotJob::new("report", Some(Instant::now()), required));
//!
//!     sched.register(fetch.clone())?;
//!     sched.register(report.clone())?;
//!
//!     report.wait_finished().await;
//!     assert!(fetch.finished_at() <= report.started_at());
//!
//!     sched.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod catalog;
mod core;
mod error;
mod events;
mod jobs;
pub mod samples;
mod subscribers;

// ---- Public re-exports ----

pub use crate::catalog::JobCatalog;
pub use crate::core::{JobStatus, Scheduler, SchedulerBuilder, SchedulerConfig};
pub use crate::error::{JobError, RuntimeError, ScheduleError};
pub use crate::events::{Bus, Event, EventKind};
pub use crate::jobs::{
    Job, JobId, JobObserver, JobRef, JobState, PROGRESS_FINISHED, PROGRESS_NOT_STARTED,
    PROGRESS_STARTED,
};
pub use crate::subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in subscriber that forwards events to `tracing`.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use crate::subscribers::LogWriter;
