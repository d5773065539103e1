//! Runtime core: registry, triggers, dispatch and lifecycle.
//!
//! This module contains the scheduling engine. The public API from this module is
//! [`Scheduler`] (with its [`SchedulerBuilder`] and [`SchedulerConfig`]) and the
//! per-job [`JobStatus`].
//!
//! Internal modules:
//! - [`entry`]: per-job state machine record (status, cached readiness, successors);
//! - [`trigger`]: cancellable delayed callback armed for a planned time;
//! - [`registry`]: entries by job identity, serialized structural mutations;
//! - [`runner`]: executes one run of a dispatched job on the worker pool;
//! - [`scheduler`]: registration, eligibility checks, rescheduling, shutdown;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod entry;
mod registry;
mod runner;
mod scheduler;
mod shutdown;
mod trigger;

pub use builder::SchedulerBuilder;
pub use config::SchedulerConfig;
pub use entry::JobStatus;
pub use scheduler::Scheduler;
