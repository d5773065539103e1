//! # Named jobs on top of a scheduler.
//!
//! [`JobCatalog`] is the presentation model a front-end would drive: it binds
//! display names to jobs, forwards additions and removals to the [`Scheduler`]
//! and renders one status line per job.
//!
//! ## Rules
//! - A name is bound to at most one job; a job is only catalogued if the
//!   scheduler accepted it.
//! - Jobs the scheduler retired on its own stay listed (with their final
//!   progress) until removed by name.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use jobvisor::{JobCatalog, Scheduler, SchedulerConfig, samples::OneShotJob};
//! use tokio::time::{Duration, Instant};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sched = Scheduler::builder(SchedulerConfig::default()).build();
//!     let catalog = JobCatalog::new(sched.clone());
//!
//!     let later = Instant::now() + Duration::from_secs(60);
//!     catalog.add("report", Arc::new(OneShotJob::new("report", Some(later), Vec::new())))?;
//!     assert_eq!(catalog.render(), "report: One shot: not completed -> 0/1000\n");
//!
//!     assert!(catalog.remove("report")?);
//!     assert!(catalog.names().is_empty());
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::Scheduler;
use crate::error::ScheduleError;
use crate::jobs::{JobRef, PROGRESS_FINISHED};

/// Display names bound to scheduled jobs.
pub struct JobCatalog {
    sched: Arc<Scheduler>,
    jobs: RwLock<BTreeMap<String, JobRef>>,
}

impl JobCatalog {
    pub fn new(sched: Arc<Scheduler>) -> Self {
        Self {
            sched,
            jobs: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.sched
    }

    /// Registers `job` under `name`.
    ///
    /// Returns `Ok(false)` if the name is taken or the job is already registered.
    pub fn add(&self, name: impl Into<String>, job: JobRef) -> Result<bool, ScheduleError> {
        let name = name.into();
        let mut jobs = self.jobs.write();
        if jobs.contains_key(&name) {
            return Ok(false);
        }
        if !self.sched.register(Arc::clone(&job))? {
            return Ok(false);
        }
        jobs.insert(name, job);
        Ok(true)
    }

    /// Unregisters the job bound to `name` and forgets the name.
    ///
    /// Returns `Ok(false)` if no job has this name. A job the scheduler already
    /// retired is simply forgotten.
    pub fn remove(&self, name: &str) -> Result<bool, ScheduleError> {
        let mut jobs = self.jobs.write();
        let Some(job) = jobs.get(name) else {
            return Ok(false);
        };
        self.sched.unregister(job.as_ref())?;
        jobs.remove(name);
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<JobRef> {
        self.jobs.read().get(name).cloned()
    }

    /// Catalogued names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.jobs.read().keys().cloned().collect()
    }

    /// One line per job: `name: description -> progress/1000`, progress clamped
    /// to `0..=1000`.
    pub fn render(&self) -> String {
        let jobs = self.jobs.read();
        let mut out = String::new();
        for (name, job) in jobs.iter() {
            let progress = job.progress().clamp(0, PROGRESS_FINISHED);
            let _ = writeln!(out, "{name}: {} -> {progress}/{PROGRESS_FINISHED}", job.describe());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SchedulerConfig;
    use crate::samples::{OneShotJob, PrimeCalcJob, PrimeCheckJob};
    use tokio::time::{Duration, Instant};

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(3600)
    }

    #[tokio::test(start_paused = true)]
    async fn names_are_unique() {
        let catalog = JobCatalog::new(Scheduler::builder(SchedulerConfig::default()).build());
        let a: JobRef = Arc::new(OneShotJob::new("a", Some(later()), Vec::new()));
        let b: JobRef = Arc::new(OneShotJob::new("b", Some(later()), Vec::new()));

        assert!(catalog.add("first", a.clone()).expect("add"));
        assert!(!catalog.add("first", b.clone()).expect("name taken"));
        assert!(!catalog.add("again", a.clone()).expect("already registered"));
        assert!(catalog.add("second", b).expect("add"));
        assert_eq!(catalog.names(), vec!["first".to_string(), "second".to_string()]);
        assert!(!catalog.remove("missing").expect("remove"));
    }

    #[tokio::test(start_paused = true)]
    async fn remove_surfaces_scheduler_refusal() {
        let catalog = JobCatalog::new(Scheduler::builder(SchedulerConfig::default()).build());
        let calc = Arc::new(PrimeCalcJob::new("calc", later(), 100));
        let check = Arc::new(PrimeCheckJob::new("check", later(), calc.clone(), 97));

        assert!(catalog.add("calc", calc).expect("add calc"));
        assert!(catalog.add("check", check).expect("add check"));

        let err = catalog.remove("calc").expect_err("calc is required");
        assert_eq!(err.as_label(), "job_required");
        assert_eq!(catalog.names().len(), 2);

        assert!(catalog.remove("check").expect("remove check"));
        assert!(catalog.remove("calc").expect("remove calc"));
        assert!(catalog.names().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn render_clamps_progress() {
        let sched = Scheduler::builder(SchedulerConfig::default()).build();
        let catalog = JobCatalog::new(sched);
        let job = Arc::new(OneShotJob::new("once", Some(Instant::now()), Vec::new()));
        assert!(catalog.add("once", job.clone()).expect("add"));
        assert_eq!(catalog.render(), "once: One shot: not completed -> 0/1000\n");

        job.wait_finished().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(catalog.render(), "once: One shot: completed -> 1000/1000\n");
        assert!(catalog.remove("once").expect("retired job is forgotten"));
    }
}
