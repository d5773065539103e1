//! # Execute one run of a dispatched job.
//!
//! Runs on the worker pool after an eligibility check won `Checking → Running`.
//!
//! ## Flow
//! ```text
//! acquire worker permit (optional, cancellable)
//!   ├─ runtime cancelled ─► Running → Checking, exit (no run)
//!   └─ acquired
//!        ├─► publish JobStarting{ job, run }
//!        ├─► before_run() + run()      (panic caught → JobError::Panicked)
//!        ├─► after_run()               (always, whatever the outcome)
//!        ├─► status = Finished
//!        ├─► publish JobFinished | JobFailed{ reason }
//!        ├─► release permit
//!        └─► reschedule (successors, re-arm / retire / keep)
//! ```
//!
//! ## Rules
//! - `after_run` is mandatory: a failing or panicking body still reaches `Finished`.
//! - The worker permit is released before rescheduling, so a successor dispatched
//!   by the reschedule step can take it.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::entry::{Entry, JobStatus};
use super::scheduler::Inner;
use crate::error::JobError;
use crate::events::{Event, EventKind};

/// Executes the body of `entry`'s job once and reschedules it.
pub(super) async fn run_body(inner: Arc<Inner>, entry: Arc<Entry>) {
    let permit = match &inner.semaphore {
        None => None,
        Some(sem) => {
            let acquired = tokio::select! {
                permit = Arc::clone(sem).acquire_owned() => permit.ok(),
                _ = inner.token.cancelled() => None,
            };
            match acquired {
                Some(permit) => Some(permit),
                None => {
                    entry.transition(JobStatus::Running, JobStatus::Checking);
                    return;
                }
            }
        }
    };

    let job = Arc::clone(entry.job());
    let run = entry.next_run();
    inner.bus.publish(
        Event::new(EventKind::JobStarting)
            .with_job(job.name())
            .with_run(run),
    );
    tracing::debug!(job = job.name(), run, "job starting");

    let body = async {
        job.before_run();
        job.run().await
    };
    let result = AssertUnwindSafe(body)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(JobError::Panicked {
                info: panic_info(panic.as_ref()),
            })
        });

    if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(|| job.after_run())) {
        tracing::error!(
            job = job.name(),
            info = %panic_info(panic.as_ref()),
            "after_run panicked"
        );
    }
    entry.set_status(JobStatus::Finished);

    match &result {
        Ok(()) => {
            inner.bus.publish(
                Event::new(EventKind::JobFinished)
                    .with_job(job.name())
                    .with_run(run),
            );
            tracing::debug!(job = job.name(), run, "job finished");
        }
        Err(err) => {
            inner.bus.publish(
                Event::new(EventKind::JobFailed)
                    .with_job(job.name())
                    .with_run(run)
                    .with_reason(err.to_string()),
            );
            tracing::warn!(job = job.name(), run, label = err.as_label(), "{}", err.as_message());
        }
    }

    drop(permit);
    inner.reschedule(&entry);
}

/// Renders a panic payload as text.
fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
