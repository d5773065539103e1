use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;

use super::config::SchedulerConfig;
use super::scheduler::{Inner, Scheduler};
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`Scheduler`].
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (registration, runs, completion decisions)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the Scheduler instance.
    ///
    /// This consumes the builder and initializes all runtime components:
    /// - Event bus for broadcasting
    /// - Subscriber workers and the bus listener feeding them
    /// - Worker semaphore (if `max_workers > 0`)
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime: the scheduler captures the
    /// current runtime handle to spawn triggers and workers.
    pub fn build(self) -> Arc<Scheduler> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));

        let semaphore = self
            .cfg
            .concurrency_limit()
            .map(Semaphore::new)
            .map(Arc::new);

        let inner = Inner::new(self.cfg, bus, Handle::current(), semaphore);
        let sched = Arc::new(Scheduler::new_internal(inner, subs));
        sched.subscriber_listener();
        sched
    }
}
