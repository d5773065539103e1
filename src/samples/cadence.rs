use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::jobs::JobState;

/// Repetition helper shared by recurring samples.
///
/// Counts launches, simulates the body's work and re-arms the job `pause`
/// after each run.
#[derive(Debug)]
pub struct Cadence {
    work: Duration,
    pause: Duration,
    launches: AtomicU32,
}

impl Cadence {
    pub fn new(work: Duration, pause: Duration) -> Self {
        Self {
            work,
            pause,
            launches: AtomicU32::new(0),
        }
    }

    /// Counts a launch and sleeps for the configured work time.
    ///
    /// Returns the launch number (1-based).
    pub async fn launch(&self) -> u32 {
        let n = self.launches.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        if !self.work.is_zero() {
            time::sleep(self.work).await;
        }
        n
    }

    pub fn launches(&self) -> u32 {
        self.launches.load(Ordering::Acquire)
    }

    /// Completion hook for recurring jobs: marks the run finished and plans the
    /// next one `pause` from now.
    pub fn rearm(&self, state: &JobState, max_progress: i32) {
        state.set_progress(max_progress);
        state.set_planned_time(Some(Instant::now() + self.pause));
    }
}
