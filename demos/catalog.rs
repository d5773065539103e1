//! # Example: catalog
//!
//! Drives a [`JobCatalog`] the way a front-end would: adds a prime calculator
//! and a few checkers that require it, prints the status lines, then removes
//! everything. Events are rendered through the built-in [`LogWriter`].
//!
//! ## Run
//! Requires the `logging` feature to export [`LogWriter`].
//! ```bash
//! RUST_LOG=jobvisor=debug cargo run --example catalog --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use jobvisor::samples::{PrimeCalcJob, PrimeCheckJob};
use jobvisor::{JobCatalog, LogWriter, Scheduler, SchedulerConfig, Subscribe};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sched = Scheduler::builder(SchedulerConfig::default())
        .with_subscribers(subs)
        .build();
    let catalog = JobCatalog::new(sched);

    let at = Instant::now() + Duration::from_millis(100);
    let calc = Arc::new(PrimeCalcJob::new("calc", at, 100_000));
    catalog.add("calc", calc.clone())?;
    for n in [7919, 99_991, 100_000, 1_000_003] {
        let check = Arc::new(PrimeCheckJob::new(format!("check-{n}"), at, calc.clone(), n));
        catalog.add(format!("check-{n}"), check)?;
    }

    print!("{}", catalog.render());

    // The checkers have not run yet and require the calculator: this is refused.
    if let Err(err) = catalog.remove("calc") {
        println!("refused: {err}");
    }

    tokio::time::sleep(Duration::from_millis(500)).await;
    print!("{}", catalog.render());

    // Checkers retired on their own, the catalog still lists them until removed.
    for name in catalog.names() {
        if name != "calc" {
            catalog.remove(&name)?;
        }
    }
    catalog.remove("calc")?;
    println!("catalogued: {}", catalog.names().len());

    tokio::time::sleep(Duration::from_millis(50)).await;
    catalog.scheduler().shutdown().await?;
    Ok(())
}
