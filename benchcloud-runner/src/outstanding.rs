//! Outstanding run set
//!
//! Remote identifiers of runs that were submitted but neither retrieved nor
//! stopped yet. Submission workers insert, the retriever and the
//! cancellation workers remove, and removal tells the caller whether it was
//! the one that settled the run, so no run is retrieved or stopped twice.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared set of unsettled remote run identifiers
#[derive(Debug, Clone, Default)]
pub struct OutstandingRuns {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl OutstandingRuns {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a run; returns `false` if the identifier is already outstanding
    pub fn insert(&self, run_id: &str) -> bool {
        self.lock().insert(run_id.to_string())
    }

    /// Settles a run; returns `false` if someone else settled it first
    pub fn remove(&self, run_id: &str) -> bool {
        self.lock().remove(run_id)
    }

    pub fn contains(&self, run_id: &str) -> bool {
        self.lock().contains(run_id)
    }

    /// Current members, in no particular order
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
