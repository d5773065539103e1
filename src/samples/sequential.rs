use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant};

use crate::error::JobError;
use crate::jobs::{Job, JobState, PROGRESS_FINISHED};

/// One-shot job made of equal stages; reports progress after each stage.
pub struct SequentialJob {
    name: String,
    state: JobState,
    stages: u32,
    stage_work: Duration,
    stage: AtomicU32,
}

impl SequentialJob {
    /// `stages` is clamped to at least 1.
    pub fn new(name: impl Into<String>, planned: Instant, stages: u32, stage_work: Duration) -> Self {
        Self {
            name: name.into(),
            state: JobState::new(Some(planned)),
            stages: stages.max(1),
            stage_work,
            stage: AtomicU32::new(0),
        }
    }

    /// Number of completed stages.
    pub fn stage(&self) -> u32 {
        self.stage.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Job for SequentialJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    async fn run(&self) -> Result<(), JobError> {
        for stage in 1..=self.stages {
            if !self.stage_work.is_zero() {
                time::sleep(self.stage_work).await;
            }
            self.stage.store(stage, Ordering::Release);
            let progress = i64::from(PROGRESS_FINISHED) * i64::from(stage) / i64::from(self.stages);
            self.state.set_progress(progress as i32);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        let stage = self.stage();
        if stage >= self.stages {
            "Sequential: completed".to_string()
        } else {
            format!("Sequential #{}", stage + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn progress_grows_per_stage() {
        let job = SequentialJob::new("seq", Instant::now(), 4, Duration::from_millis(10));
        assert_eq!(job.describe(), "Sequential #1");

        job.run().await.expect("run");
        assert_eq!(job.stage(), 4);
        assert_eq!(job.progress(), PROGRESS_FINISHED);
        assert_eq!(job.describe(), "Sequential: completed");
    }
}
