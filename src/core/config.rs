//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`] centralized settings for the scheduler runtime.
//!
//! ## Sentinel values
//! - `max_workers = 0` → unlimited (no worker semaphore created)
//! - `bus_capacity = 0` → clamped to 1 by the bus

use std::time::Duration;

/// Global configuration for the scheduler runtime.
///
/// ## Field semantics
/// - `max_workers`: bound of the worker pool (`0` = unlimited)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `grace`: Maximum wait for running job bodies on shutdown
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Maximum number of job bodies executing at the same time.
    ///
    /// - `0` = unlimited (no semaphore)
    /// - `n > 0` = at most `n` bodies run simultaneously; further dispatched jobs
    ///   wait for a free slot (they already count as running)
    pub max_workers: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,

    /// Maximum time [`Scheduler::shutdown`](crate::Scheduler::shutdown) waits for
    /// running job bodies before returning `RuntimeError::GraceExceeded`.
    pub grace: Duration,
}

impl SchedulerConfig {
    /// Returns the worker limit as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` concurrent job bodies
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_workers == 0 {
            None
        } else {
            Some(self.max_workers)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `max_workers = 1` (a single worker)
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    fn default() -> Self {
        Self {
            max_workers: 1,
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        let mut cfg = SchedulerConfig::default();
        assert_eq!(cfg.concurrency_limit(), Some(1));

        cfg.max_workers = 0;
        cfg.bus_capacity = 0;
        assert_eq!(cfg.concurrency_limit(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
