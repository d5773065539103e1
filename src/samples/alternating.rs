//! Ping-pong pair: two recurring jobs that take turns.
//!
//! Each half observes its partner's progress and is ready only while the partner
//! is not running (partner progress is "not started" or "finished"). After each
//! run a half re-arms immediately and sets its readiness to the opposite of the
//! partner's, which hands the turn over. There is no prerequisite edge between
//! the two, so the registry holds no cycle.

use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::cadence::Cadence;
use crate::error::JobError;
use crate::jobs::{Job, JobId, JobObserver, JobState, PROGRESS_FINISHED, PROGRESS_NOT_STARTED};

/// One half of a ping-pong (or producer/consumer) pair.
pub struct AlternatingJob {
    name: String,
    state: JobState,
    cadence: Cadence,
    partner: OnceLock<Weak<AlternatingJob>>,
}

impl AlternatingJob {
    /// Builds a wired pair. `first` starts ready, `second` waits for its turn.
    ///
    /// Both halves are planned at `planned`, work for `work` per run and never retire.
    pub fn pair(
        first: impl Into<String>,
        second: impl Into<String>,
        planned: Instant,
        work: Duration,
    ) -> (Arc<AlternatingJob>, Arc<AlternatingJob>) {
        let a = Arc::new(Self::half(first.into(), planned, work, true));
        let b = Arc::new(Self::half(second.into(), planned, work, false));
        Self::wire(&a, &b);
        Self::wire(&b, &a);
        (a, b)
    }

    fn half(name: String, planned: Instant, work: Duration, ready: bool) -> Self {
        Self {
            name,
            state: JobState::new(Some(planned)).initially_ready(ready),
            cadence: Cadence::new(work, Duration::ZERO),
            partner: OnceLock::new(),
        }
    }

    /// Makes `me` track `partner`'s progress.
    fn wire(me: &Arc<AlternatingJob>, partner: &Arc<AlternatingJob>) {
        let _ = me.partner.set(Arc::downgrade(partner));
        let observer: Arc<dyn JobObserver> = me.clone();
        partner.add_observer(&observer);
    }

    fn partner(&self) -> Option<Arc<AlternatingJob>> {
        self.partner.get().and_then(Weak::upgrade)
    }

    /// Number of times the body has been launched.
    pub fn launches(&self) -> u32 {
        self.cadence.launches()
    }
}

impl JobObserver for AlternatingJob {
    fn on_progress(&self, job: JobId, progress: i32) {
        let is_partner = self.partner().is_some_and(|p| p.id() == job);
        if !is_partner {
            return;
        }
        let partner_idle = progress == PROGRESS_NOT_STARTED || progress == PROGRESS_FINISHED;
        self.state.set_ready(partner_idle);
    }

    fn on_ready(&self, _job: JobId, _ready: bool) {}
}

#[async_trait]
impl Job for AlternatingJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    async fn run(&self) -> Result<(), JobError> {
        self.cadence.launch().await;
        if let Some(partner) = self.partner() {
            self.state.set_ready(!partner.ready_status());
        }
        Ok(())
    }

    fn after_run(&self) {
        self.cadence.rearm(&self.state, self.max_progress());
    }

    fn auto_retire(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        format!("Alternating #{}", self.launches())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn partner_progress_drives_readiness() {
        let (ping, pong) = AlternatingJob::pair("ping", "pong", Instant::now(), Duration::ZERO);
        assert!(ping.ready_status());
        assert!(!pong.ready_status());

        ping.before_run();
        assert!(!pong.ready_status());

        ping.run().await.expect("run");
        ping.after_run();
        assert!(pong.ready_status());
        assert!(ping.planned_time().is_some());
        assert_eq!(ping.launches(), 1);
    }
}
