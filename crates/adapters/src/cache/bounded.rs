// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded in-memory entry cache

use super::EntryCache;
use keel_core::LogEntry;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Capacity-bounded cache of recently appended entries
///
/// When full, the lowest index is evicted first: the apply loop consumes
/// entries in index order, so the oldest entry is the one most likely to
/// have been applied already.
#[derive(Clone)]
pub struct BoundedEntryCache {
    inner: Arc<Mutex<BTreeMap<u64, LogEntry>>>,
    capacity: usize,
}

impl BoundedEntryCache {
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BTreeMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntryCache for BoundedEntryCache {
    fn get(&self, index: u64) -> Option<LogEntry> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&index)
            .cloned()
    }

    fn put(&self, index: u64, entry: LogEntry) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.insert(index, entry);
        while inner.len() > self.capacity {
            if let Some((evicted, _)) = inner.pop_first() {
                tracing::trace!(index = evicted, "evicted cached entry");
            }
        }
    }

    fn prune(&self, index: u64) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&index);
    }
}

#[cfg(test)]
#[path = "bounded_tests.rs"]
mod tests;
