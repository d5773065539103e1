//! # Example: periodic
//!
//! A recurring job (work 500ms, pause 500ms) and a staged one-shot job running
//! side by side on two workers. Stops on Ctrl-C or after a few seconds.
//!
//! ## Flow
//! ```text
//! tick:   run ──► after_run (planned = now + pause) ──► JobRearmed ──► run ...
//! stages: run ──► progress 250, 500, 750, 1000 ──► JobRetired
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example periodic
//! ```

use std::sync::Arc;
use std::time::Duration;

use jobvisor::samples::{PeriodicJob, SequentialJob};
use jobvisor::{Job, Scheduler, SchedulerConfig};
use tokio::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = SchedulerConfig::default();
    cfg.max_workers = 2;
    cfg.grace = Duration::from_secs(2);
    let sched = Scheduler::builder(cfg).build();

    let tick = Arc::new(PeriodicJob::new(
        "tick",
        Instant::now(),
        Duration::from_millis(500),
        Duration::from_millis(500),
    ));
    let stages = Arc::new(SequentialJob::new(
        "stages",
        Instant::now() + Duration::from_millis(200),
        4,
        Duration::from_millis(400),
    ));
    sched.register(tick.clone())?;
    sched.register(stages.clone())?;

    let report = async {
        let mut every = tokio::time::interval(Duration::from_millis(500));
        for _ in 0..8 {
            every.tick().await;
            println!(
                "{} ({}/1000) | {} ({}/1000)",
                tick.describe(),
                tick.progress(),
                stages.describe(),
                stages.progress()
            );
        }
    };

    tokio::select! {
        _ = report => {}
        _ = tokio::signal::ctrl_c() => println!("interrupted"),
    }

    sched.shutdown().await?;
    println!("tick launched {} times", tick.launches());
    Ok(())
}
