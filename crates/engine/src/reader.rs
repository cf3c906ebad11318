// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry reads unifying the in-flight cache and the cold log
//!
//! A reader starts warm, serving from the cache. The first miss opens one
//! forward log cursor and the reader stays cold for the rest of its life:
//! eviction at index `i` says nothing about `i + 1`, and mixing cache hits
//! into an open cursor walk could serve a later index from the cache while
//! an earlier one came from the log.

use keel_adapters::{EntryCache, LogCursor, LogError, ReplicatedLog};
use keel_core::LogEntry;
use thiserror::Error;

/// Errors from entry reads
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("log error: {0}")]
    Log(#[from] LogError),
    /// The commit-index contract was broken: a committed index could be
    /// obtained from neither the cache nor the log. Fatal, non-retryable.
    #[error("committed entry {index} unobtainable from cache or log")]
    EntryUnavailable { index: u64 },
}

/// Where the next entry comes from
///
/// Exhaustive by construction: once cold there is no way back to warm.
enum ReadSource<Cursor> {
    /// Cache still worth probing
    Warm,
    /// Cache missed once; all further reads walk this single cursor
    Cold(Cursor),
}

/// Reads committed entries, preferring the cache until its first miss
pub struct EntryReader<L: ReplicatedLog, C: EntryCache> {
    log: L,
    cache: C,
    clear_cache: bool,
    source: ReadSource<L::Cursor>,
}

impl<L, C> EntryReader<L, C>
where
    L: ReplicatedLog,
    C: EntryCache,
{
    /// Create a warm reader
    ///
    /// With `clear_cache`, entries are pruned from the cache as they are
    /// served, since the apply loop reads each index exactly once.
    pub fn new(log: L, cache: C, clear_cache: bool) -> Self {
        Self {
            log,
            cache,
            clear_cache,
            source: ReadSource::Warm,
        }
    }

    /// Get the committed entry at `index`
    pub fn get(&mut self, index: u64) -> Result<LogEntry, ReadError> {
        match &mut self.source {
            ReadSource::Warm => {
                if let Some(entry) = self.cache.get(index) {
                    if self.clear_cache {
                        self.cache.prune(index);
                    }
                    return Ok(entry);
                }

                tracing::debug!(index, "cache miss, opening log cursor");
                let mut cursor = self.log.cursor(index)?;
                let entry = Self::advance_to(&mut cursor, index);
                self.source = ReadSource::Cold(cursor);
                entry
            }
            ReadSource::Cold(cursor) => Self::advance_to(cursor, index),
        }
    }

    /// Advance the cursor until it yields `index`
    ///
    /// Exhaustion before the requested index, or the cursor skipping past
    /// it, means the commit-index contract was violated.
    fn advance_to(cursor: &mut L::Cursor, index: u64) -> Result<LogEntry, ReadError> {
        while let Some(entry) = cursor.next_entry()? {
            if entry.index == index {
                return Ok(entry);
            }
            if entry.index > index {
                break;
            }
        }
        Err(ReadError::EntryUnavailable { index })
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
