//! # Runtime events emitted by the scheduler.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registry events**: jobs entering or leaving the registry
//! - **Lifecycle events**: trigger firing, eligibility checks, body execution
//! - **Completion events**: what the scheduler decided after a run (re-arm, retire, keep)
//! - **Runtime events**: shutdown and subscriber health
//!
//! The [`Event`] struct carries additional metadata such as timestamps, job name,
//! reasons, and re-arm delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use jobvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::JobRearmed)
//!     .with_job("nightly-report")
//!     .with_run(3)
//!     .with_delay(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::JobRearmed);
//! assert_eq!(ev.job.as_deref(), Some("nightly-report"));
//! assert_eq!(ev.delay_ms, Some(5_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registry events ===
    /// Job accepted and its trigger armed.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `delay_ms`: time until the planned instant (0 if already due)
    JobRegistered,

    /// Job removed on request.
    ///
    /// Sets:
    /// - `job`: job name
    JobUnregistered,

    // === Lifecycle events ===
    /// Planned time reached; the entry moved to checking.
    ///
    /// Sets:
    /// - `job`: job name
    TriggerFired,

    /// Eligibility check deferred; the entry stays in checking until woken.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `reason`: `not_ready` or `required_unfinished`
    JobWaiting,

    /// Job body is about to run.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `run`: run number (1-based, per registration)
    JobStarting,

    /// Job body and hooks completed.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `run`: run number
    JobFinished,

    /// Job body returned an error or panicked (hooks still ran).
    ///
    /// Sets:
    /// - `job`: job name
    /// - `run`: run number
    /// - `reason`: failure message
    JobFailed,

    // === Completion decisions ===
    /// Job wants to run again; a fresh entry was armed.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `delay_ms`: time until the next planned instant
    /// - `run`: runs completed so far
    JobRearmed,

    /// One-shot job without successors was removed after completion.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `run`: runs completed
    JobRetired,

    /// Job will not run again but stays registered (successors depend on it,
    /// or it opted out of auto-retirement). The caller removes it.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `reason`: `has_successors` or `auto_retire_disabled`
    JobKept,

    // === Runtime events ===
    /// Shutdown requested (explicitly or by OS signal).
    ShutdownRequested,

    /// All running job bodies completed within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some job bodies were still running.
    GraceExceeded,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `job`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `job`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the job (or subscriber), if applicable.
    pub job: Option<Arc<str>>,
    /// Human-readable reason (errors, deferral cause, overflow details).
    pub reason: Option<Arc<str>>,
    /// Delay until the planned instant in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Run number of the job (starting from 1).
    pub run: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            reason: None,
            delay_ms: None,
            run: None,
        }
    }

    /// Attaches a job name.
    #[inline]
    pub fn with_job(mut self, job: impl Into<Arc<str>>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a run number.
    #[inline]
    pub fn with_run(mut self, n: u32) -> Self {
        self.run = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_job(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_job(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
