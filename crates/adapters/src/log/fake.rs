// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake replicated log for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{LogCursor, LogError, ReplicatedLog};
use keel_core::LogEntry;
use std::sync::{Arc, Mutex};

/// Recorded log interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogCall {
    CursorOpened { from: u64 },
    Advanced,
}

/// Fake replicated log for testing
///
/// Holds seeded entries and records every cursor open and advance so tests
/// can assert how the log was walked.
#[derive(Clone, Default)]
pub struct FakeLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    calls: Arc<Mutex<Vec<LogCall>>>,
}

impl FakeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a committed entry (not recorded as a call)
    pub fn push(&self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<LogCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of cursors opened so far
    pub fn cursors_opened(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, LogCall::CursorOpened { .. }))
            .count()
    }

    fn record(&self, call: LogCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

impl ReplicatedLog for FakeLog {
    type Cursor = FakeCursor;

    fn cursor(&self, from: u64) -> Result<Self::Cursor, LogError> {
        self.record(LogCall::CursorOpened { from });
        Ok(FakeCursor {
            log: self.clone(),
            next: from,
        })
    }
}

/// Cursor over a [`FakeLog`]
pub struct FakeCursor {
    log: FakeLog,
    next: u64,
}

impl LogCursor for FakeCursor {
    fn next_entry(&mut self) -> Result<Option<LogEntry>, LogError> {
        self.log.record(LogCall::Advanced);
        let entries = self.log.entries.lock().unwrap_or_else(|e| e.into_inner());
        let found = entries
            .iter()
            .find(|entry| entry.index == self.next)
            .cloned();
        if found.is_some() {
            self.next += 1;
        }
        Ok(found)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
