//! # Delayed trigger.
//!
//! A [`Trigger`] is an opaque, cancellable delayed-callback handle. Arming it
//! spawns one task that sleeps until the planned instant and then runs the
//! callback, unless the trigger was cancelled first.
//!
//! ## Rules
//! - Each trigger owns a child of the runtime token: runtime shutdown cancels
//!   every armed trigger.
//! - Cancellation wins over expiry when both are ready (`biased` select).
//! - Arming an already-cancelled trigger is a no-op (the task exits immediately).
//! - The callback runs at most once per arming.

use tokio::runtime::Handle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

pub(crate) struct Trigger {
    token: CancellationToken,
}

impl Trigger {
    /// Creates an unarmed trigger cancelled together with `parent`.
    pub(crate) fn new(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    /// Schedules `fire` to run on `runtime` at `at` (immediately if `at` is in the past).
    pub(crate) fn arm<F>(&self, runtime: &Handle, at: Instant, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.token.clone();
        runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = time::sleep_until(at) => fire(),
            }
        });
    }

    /// Discards the trigger; a pending callback will not run.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}
