//! # Example: one_shot
//!
//! Minimal example: one job due now, one job due in a second, no subscribers.
//!
//! Demonstrates how to:
//! - Build a [`Scheduler`] from [`SchedulerConfig`].
//! - Register [`OneShotJob`]s with different planned times.
//! - Observe that a finished one-shot job is retired from the registry.
//!
//! ## Flow
//! ```text
//! register(now)   ──► trigger fires ──► run ──► Finished ──► JobRetired
//! register(+1s)   ──► PendingTime ... trigger fires ──► run ──► JobRetired
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example one_shot
//! ```

use std::sync::Arc;
use std::time::Duration;

use jobvisor::samples::OneShotJob;
use jobvisor::{Job, Scheduler, SchedulerConfig};
use tokio::time::Instant;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Defaults: one worker, 30s shutdown grace
    let sched = Scheduler::builder(SchedulerConfig::default()).build();

    // 2. One job due now, one due in a second
    let now = Arc::new(
        OneShotJob::new("now", Some(Instant::now()), Vec::new())
            .with_work(Duration::from_millis(200)),
    );
    let later = Arc::new(OneShotJob::new(
        "later",
        Some(Instant::now() + Duration::from_secs(1)),
        Vec::new(),
    ));
    sched.register(now.clone())?;
    sched.register(later.clone())?;
    println!("registered: {}", sched.scheduled_jobs().len());

    // 3. Wait for both and show that they were retired
    now.wait_finished().await;
    println!("[{}] {}", now.name(), now.describe());
    later.wait_finished().await;
    println!("[{}] {}", later.name(), later.describe());

    tokio::time::sleep(Duration::from_millis(10)).await;
    println!("still registered: {}", sched.scheduled_jobs().len());

    sched.shutdown().await?;
    Ok(())
}
