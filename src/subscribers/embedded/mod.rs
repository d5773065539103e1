//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders every event as a `tracing` record (demo/debug).

mod log;

pub use log::LogWriter;
