//! # Example: ping_pong
//!
//! Two jobs that take turns through readiness only: each half is ready while
//! its partner is idle and hands the turn over after every run.
//!
//! ## Run
//! ```bash
//! cargo run --example ping_pong
//! ```

use std::time::Duration;

use jobvisor::samples::AlternatingJob;
use jobvisor::{Job, Scheduler, SchedulerConfig};
use tokio::time::Instant;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = SchedulerConfig::default();
    cfg.max_workers = 2;
    let sched = Scheduler::builder(cfg).build();

    let (ping, pong) =
        AlternatingJob::pair("ping", "pong", Instant::now(), Duration::from_millis(250));
    sched.register(ping.clone())?;
    sched.register(pong.clone())?;

    for _ in 0..6 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        println!(
            "ping: {} ready={} | pong: {} ready={}",
            ping.describe(),
            ping.ready_status(),
            pong.describe(),
            pong.ready_status()
        );
    }

    sched.shutdown().await?;
    Ok(())
}
