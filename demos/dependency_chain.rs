//! # Example: dependency_chain
//!
//! Three jobs where `load` requires `extract` and `report` requires `load`.
//! All three are due at the same instant; the prerequisite gate orders them.
//!
//! Also shows a custom [`Subscribe`] implementation printing job lifecycle events.
//!
//! ## Flow
//! ```text
//! extract ──► Finished ──► wakes load ──► Finished ──► wakes report ──► Finished
//!    │                        │
//!    └─ JobKept (has_successors), removed by the caller at the end
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example dependency_chain
//! ```

use std::sync::Arc;
use std::time::Duration;

use jobvisor::samples::OneShotJob;
use jobvisor::{Event, EventKind, JobRef, Scheduler, SchedulerConfig, Subscribe};
use tokio::time::Instant;

/// Prints the lifecycle events of every job.
struct ConsoleSubscriber;

#[async_trait::async_trait]
impl Subscribe for ConsoleSubscriber {
    async fn on_event(&self, ev: &Event) {
        let job = ev.job.as_deref().unwrap_or("<none>");
        match ev.kind {
            EventKind::JobWaiting => {
                println!("[sub] waiting:  job={job} reason={}", ev.reason.as_deref().unwrap_or("?"));
            }
            EventKind::JobStarting => {
                println!("[sub] starting: job={job} run={}", ev.run.unwrap_or(0));
            }
            EventKind::JobFinished => println!("[sub] finished: job={job}"),
            EventKind::JobKept => {
                println!("[sub] kept:     job={job} reason={}", ev.reason.as_deref().unwrap_or("?"));
            }
            EventKind::JobRetired => println!("[sub] retired:  job={job}"),
            EventKind::JobUnregistered => println!("[sub] removed:  job={job}"),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = SchedulerConfig::default();
    cfg.max_workers = 2;
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(ConsoleSubscriber)];
    let sched = Scheduler::builder(cfg).with_subscribers(subs).build();

    let at = Instant::now();
    let extract = Arc::new(
        OneShotJob::new("extract", Some(at), Vec::new()).with_work(Duration::from_millis(300)),
    );
    let required: Vec<JobRef> = vec![extract.clone()];
    let load = Arc::new(
        OneShotJob::new("load", Some(at), required).with_work(Duration::from_millis(200)),
    );
    let required: Vec<JobRef> = vec![load.clone()];
    let report = Arc::new(OneShotJob::new("report", Some(at), required));

    // Prerequisites must be registered first.
    sched.register(extract.clone())?;
    sched.register(load.clone())?;
    sched.register(report.clone())?;

    report.wait_finished().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    // `extract` and `load` had successors when they finished: remove them now,
    // successors first.
    sched.unregister(load.as_ref())?;
    sched.unregister(extract.as_ref())?;
    println!("still registered: {}", sched.scheduled_jobs().len());

    // Let the subscriber drain.
    tokio::time::sleep(Duration::from_millis(50)).await;
    sched.shutdown().await?;
    Ok(())
}
