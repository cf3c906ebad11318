// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory replicated log

use super::{LogCursor, LogError, ReplicatedLog};
use keel_core::{EntryContent, LogEntry};
use std::sync::{Arc, Mutex};

/// In-memory committed log
///
/// Entry at position `i` holds index `i`; appends assign indices
/// contiguously. Cursors observe entries appended after they were opened,
/// matching the durable log's exhausted-means-no-further-entries-yet
/// contract.
#[derive(Clone, Default)]
pub struct MemoryLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed entry, assigning the next index
    pub fn append(&self, term: u64, content: EntryContent) -> LogEntry {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = LogEntry {
            index: entries.len() as u64,
            term,
            content,
        };
        entries.push(entry.clone());
        entry
    }

    /// Index of the last committed entry, if any
    pub fn last_index(&self) -> Option<u64> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.last().map(|entry| entry.index)
    }

    /// Number of committed entries
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the log holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReplicatedLog for MemoryLog {
    type Cursor = MemoryCursor;

    fn cursor(&self, from: u64) -> Result<Self::Cursor, LogError> {
        Ok(MemoryCursor {
            entries: Arc::clone(&self.entries),
            next: from,
        })
    }
}

/// Forward cursor over a [`MemoryLog`]
pub struct MemoryCursor {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    next: u64,
}

impl LogCursor for MemoryCursor {
    fn next_entry(&mut self) -> Result<Option<LogEntry>, LogError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(self.next as usize) {
            Some(entry) => {
                self.next += 1;
                Ok(Some(entry.clone()))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
