use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use synclink_sched::StateReader;

use crate::receive::StateWriter;

/// Shared in-memory state map implementing both store interfaces.
///
/// Real hosts plug their own store in through [`StateReader`] and
/// [`StateWriter`]; this map covers demos, tests, and hosts whose state is
/// genuinely just a segment-per-index table. Clones share the same map, so
/// a host thread can update segments while the link holds another handle.
#[derive(Debug, Default)]
pub struct SharedStateMap<I: Ord, S> {
    inner: Arc<Mutex<BTreeMap<I, S>>>,
}

impl<I: Ord, S> SharedStateMap<I, S> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<I, S>> {
        // A poisoned lock only means a panic elsewhere; the map itself is
        // still a consistent segment table.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Set one segment's current value.
    pub fn set(&self, index: I, segment: S) {
        self.lock().insert(index, segment);
    }

    /// Remove one segment (it becomes unavailable).
    pub fn remove(&self, index: &I) {
        self.lock().remove(index);
    }

    /// Current value of one segment.
    pub fn get(&self, index: &I) -> Option<S>
    where
        S: Clone,
    {
        self.lock().get(index).cloned()
    }

    /// Number of segments currently present.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<I: Ord, S> Clone for SharedStateMap<I, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: Copy + Ord, S: Clone> StateReader<I, S> for SharedStateMap<I, S> {
    fn read_segment(&self, index: I) -> Option<S> {
        self.lock().get(&index).cloned()
    }
}

impl<I: Copy + Ord, S> StateWriter<I, S> for SharedStateMap<I, S> {
    fn apply_update(&mut self, index: I, segment: S) {
        self.lock().insert(index, segment);
    }
}
