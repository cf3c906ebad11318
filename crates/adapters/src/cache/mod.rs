// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-flight entry cache
//!
//! Best-effort cache of recently appended entries, mutated by the
//! replication-ingestion path concurrently with reads from the apply loop.
//! An absent entry is never an error; the durable log is authoritative.

mod bounded;

pub use bounded::BoundedEntryCache;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{CacheCall, FakeCache};

use keel_core::LogEntry;

/// Best-effort cache of recently appended entries
pub trait EntryCache: Clone + Send + Sync + 'static {
    /// Look up an entry; absence is expected, not an error
    fn get(&self, index: u64) -> Option<LogEntry>;

    /// Insert or replace an entry
    fn put(&self, index: u64, entry: LogEntry);

    /// Drop an entry; no-op if absent
    fn prune(&self, index: u64);
}
