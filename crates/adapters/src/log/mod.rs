// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replicated log access
//!
//! The log is the authoritative, durable, ordered source of committed
//! entries. Readers walk it with single-use forward cursors.

mod memory;

pub use memory::{MemoryCursor, MemoryLog};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCursor, FakeLog, LogCall};

use keel_core::LogEntry;
use thiserror::Error;

/// Errors from log access
#[derive(Debug, Error)]
pub enum LogError {
    #[error("log cursor failed: {0}")]
    Cursor(String),
    #[error("log read failed: {0}")]
    Read(String),
}

/// One forward pass over committed entries
pub trait LogCursor: Send {
    /// Next committed entry in ascending index order
    ///
    /// `None` means no further committed entries currently exist.
    fn next_entry(&mut self) -> Result<Option<LogEntry>, LogError>;
}

/// Durable, ordered, append-only source of committed entries
pub trait ReplicatedLog: Clone + Send + Sync + 'static {
    type Cursor: LogCursor;

    /// Open a forward cursor yielding entries ascending from `from`
    fn cursor(&self, from: u64) -> Result<Self::Cursor, LogError>;
}
