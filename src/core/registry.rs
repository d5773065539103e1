//! # Job registry: schedule entries keyed by job identity.
//!
//! The registry maps [`JobId`] to the current [`Entry`] of each registered job.
//! Lookups go straight to the concurrent map; every structural mutation goes
//! through a [`Structure`] guard obtained from [`Registry::structure`].
//!
//! ## Rules
//! - **Invariant**: if a job is present, every job it requires is present too.
//! - Insert, remove and successor linking are only reachable through `Structure`,
//!   so they are serialized by one mutex.
//! - Map guards are never held while another lock is taken: lookups clone the
//!   `Arc<Entry>` out and release the shard immediately.
//! - Lock order: structure mutex, then an entry's successor guard.
//!
//! ## Architecture
//! ```text
//! register / unregister / reschedule ──► Structure (mutex) ──► insert / remove / link / unlink
//! trigger / observer / worker        ──► get(id) ──► Arc<Entry> (no structure lock)
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};

use super::entry::Entry;
use crate::jobs::{Job, JobId, JobRef};

pub(crate) struct Registry {
    entries: DashMap<JobId, Arc<Entry>>,
    structure: Mutex<()>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
            structure: Mutex::new(()),
        }
    }

    /// Current entry of a job, if registered.
    pub(crate) fn get(&self, id: JobId) -> Option<Arc<Entry>> {
        self.entries.get(&id).map(|e| Arc::clone(e.value()))
    }

    pub(crate) fn contains(&self, id: JobId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Snapshot of all current entries, ordered by job id.
    pub(crate) fn entries(&self) -> Vec<Arc<Entry>> {
        let mut all: Vec<Arc<Entry>> = self.entries.iter().map(|e| Arc::clone(e.value())).collect();
        all.sort_unstable_by_key(|e| e.job().id());
        all
    }

    /// Snapshot of all registered jobs, ordered by job id.
    pub(crate) fn jobs(&self) -> Vec<JobRef> {
        self.entries().iter().map(|e| Arc::clone(e.job())).collect()
    }

    /// Locks the registry structure for mutation.
    pub(crate) fn structure(&self) -> Structure<'_> {
        Structure {
            registry: self,
            _guard: self.structure.lock(),
        }
    }
}

/// Exclusive access to the registry structure.
pub(crate) struct Structure<'a> {
    registry: &'a Registry,
    _guard: MutexGuard<'a, ()>,
}

impl Structure<'_> {
    pub(crate) fn get(&self, id: JobId) -> Option<Arc<Entry>> {
        self.registry.get(id)
    }

    pub(crate) fn contains(&self, id: JobId) -> bool {
        self.registry.contains(id)
    }

    /// `true` if `entry` is the entry currently stored for its job.
    pub(crate) fn is_current(&self, entry: &Arc<Entry>) -> bool {
        self.registry
            .get(entry.job().id())
            .is_some_and(|current| Arc::ptr_eq(&current, entry))
    }

    /// Entries of every job `job` requires.
    ///
    /// Fails with the name of the first required job that is not registered.
    pub(crate) fn required_entries(&self, job: &dyn Job) -> Result<Vec<Arc<Entry>>, String> {
        job.required_jobs()
            .iter()
            .map(|req| self.registry.get(req.id()).ok_or_else(|| req.name().to_string()))
            .collect()
    }

    /// Stores `entry`, replacing the previous entry of the same job.
    pub(crate) fn insert(&self, entry: Arc<Entry>) -> Option<Arc<Entry>> {
        self.registry.entries.insert(entry.job().id(), entry)
    }

    pub(crate) fn remove(&self, id: JobId) -> Option<Arc<Entry>> {
        self.registry.entries.remove(&id).map(|(_, e)| e)
    }

    /// Records `job` as a successor of every entry in `required`.
    pub(crate) fn link(&self, required: &[Arc<Entry>], job: &JobRef) {
        for entry in required {
            entry.successors().insert(job.id(), Arc::clone(job));
        }
    }

    /// Drops `id` from the successor sets of every entry in `required`.
    pub(crate) fn unlink(&self, required: &[Arc<Entry>], id: JobId) {
        for entry in required {
            entry.successors().remove(&id);
        }
    }
}
