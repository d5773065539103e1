use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::cadence::Cadence;
use crate::error::JobError;
use crate::jobs::{Job, JobState};

/// Job that runs forever: works for `work`, then pauses for `pause` before
/// the next launch.
pub struct PeriodicJob {
    name: String,
    state: JobState,
    cadence: Cadence,
}

impl PeriodicJob {
    pub fn new(name: impl Into<String>, first: Instant, work: Duration, pause: Duration) -> Self {
        Self {
            name: name.into(),
            state: JobState::new(Some(first)),
            cadence: Cadence::new(work, pause),
        }
    }

    /// Number of times the body has been launched.
    pub fn launches(&self) -> u32 {
        self.cadence.launches()
    }
}

#[async_trait]
impl Job for PeriodicJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    async fn run(&self) -> Result<(), JobError> {
        self.cadence.launch().await;
        Ok(())
    }

    fn after_run(&self) {
        self.cadence.rearm(&self.state, self.max_progress());
    }

    fn describe(&self) -> String {
        format!("Periodic #{}", self.launches())
    }
}
