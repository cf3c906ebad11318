// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake entry cache for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::EntryCache;
use keel_core::LogEntry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded cache interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCall {
    Get { index: u64 },
    Put { index: u64 },
    Prune { index: u64 },
}

/// Fake entry cache for testing
///
/// Records every interaction so tests can assert how the cache was probed.
#[derive(Clone, Default)]
pub struct FakeCache {
    entries: Arc<Mutex<HashMap<u64, LogEntry>>>,
    calls: Arc<Mutex<Vec<CacheCall>>>,
}

impl FakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without recording a call
    pub fn seed(&self, index: u64, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(index, entry);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<CacheCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of lookups so far
    pub fn gets(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, CacheCall::Get { .. }))
            .count()
    }

    /// Whether an entry is currently cached
    pub fn contains(&self, index: u64) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&index)
    }

    fn record(&self, call: CacheCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

impl EntryCache for FakeCache {
    fn get(&self, index: u64) -> Option<LogEntry> {
        self.record(CacheCall::Get { index });
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&index)
            .cloned()
    }

    fn put(&self, index: u64, entry: LogEntry) {
        self.record(CacheCall::Put { index });
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(index, entry);
    }

    fn prune(&self, index: u64) {
        self.record(CacheCall::Prune { index });
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&index);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
