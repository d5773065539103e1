//! # Event subscribers for the jobvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scheduler / triggers / workers ── publish(Event) ──► Bus ──► listener
//!                                                                  │
//!                                                         SubscriberSet::emit(&Event)
//!                                                    ┌─────────┬─────┴───┬─────────┐
//!                                                    ▼         ▼         ▼         ▼
//!                                                LogWriter  Metrics   Custom      ...
//! ```
//!
//! Subscribers only observe: the engine never waits for them and never reads their state.

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
