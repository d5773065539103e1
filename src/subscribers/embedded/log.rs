//! # LogWriter: event-to-tracing bridge
//!
//! A minimal subscriber that renders incoming [`Event`]s as `tracing` records
//! (target `jobvisor::events`). Install any `tracing` subscriber to see them.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO jobvisor::events: registered job="calc" delay_ms=Some(0)
//! DEBUG jobvisor::events: waiting job="check-7" reason=Some("required_unfinished")
//! INFO jobvisor::events: starting job="calc" run=Some(1)
//! INFO jobvisor::events: finished job="calc" run=Some(1)
//! INFO jobvisor::events: kept job="calc" reason=Some("auto_retire_disabled")
//! WARN jobvisor::events: failed job="fetch" run=Some(2) reason=Some("execution failed: timeout")
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let job = e.job.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::JobRegistered => {
                tracing::info!(target: "jobvisor::events", job, delay_ms = ?e.delay_ms, "registered");
            }
            EventKind::JobUnregistered => {
                tracing::info!(target: "jobvisor::events", job, "unregistered");
            }
            EventKind::TriggerFired => {
                tracing::debug!(target: "jobvisor::events", job, "trigger fired");
            }
            EventKind::JobWaiting => {
                tracing::debug!(target: "jobvisor::events", job, reason = ?e.reason, "waiting");
            }
            EventKind::JobStarting => {
                tracing::info!(target: "jobvisor::events", job, run = ?e.run, "starting");
            }
            EventKind::JobFinished => {
                tracing::info!(target: "jobvisor::events", job, run = ?e.run, "finished");
            }
            EventKind::JobFailed => {
                tracing::warn!(target: "jobvisor::events", job, run = ?e.run, reason = ?e.reason, "failed");
            }
            EventKind::JobRearmed => {
                tracing::info!(target: "jobvisor::events", job, run = ?e.run, delay_ms = ?e.delay_ms, "rearmed");
            }
            EventKind::JobRetired => {
                tracing::info!(target: "jobvisor::events", job, run = ?e.run, "retired");
            }
            EventKind::JobKept => {
                tracing::info!(target: "jobvisor::events", job, reason = ?e.reason, "kept");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: "jobvisor::events", "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(target: "jobvisor::events", "all jobs stopped within grace");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(target: "jobvisor::events", "grace exceeded");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "jobvisor::events", subscriber = job, reason = ?e.reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: "jobvisor::events", subscriber = job, reason = ?e.reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
