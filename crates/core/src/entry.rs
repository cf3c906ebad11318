// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Committed log entry model

use crate::session::{OperationId, SessionId};
use serde::{Deserialize, Serialize};

/// A single committed entry in the replicated log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique, strictly increasing log index
    pub index: u64,
    /// Consensus term under which the entry was committed
    pub term: u64,
    /// What the entry carries
    pub content: EntryContent,
}

/// Entry content
///
/// Exhaustive, so the apply loop branches statically and cannot fall
/// through an unhandled content kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryContent {
    /// Consensus-internal marker (term barrier, no-op). Advances the
    /// apply cursor without dispatch or session bookkeeping.
    Control,
    /// A replicated client command
    Command(Command),
}

/// A replicated client command with the identity needed for deduplication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Opaque replicated content, executed by the dispatcher
    pub payload: Vec<u8>,
    /// Stable identity of the submitting client session
    pub session: SessionId,
    /// Per-session sequence number; used for deduplication, not an index
    pub operation: OperationId,
}

impl LogEntry {
    /// Create a control entry
    pub fn control(index: u64, term: u64) -> Self {
        Self {
            index,
            term,
            content: EntryContent::Control,
        }
    }

    /// Create a command entry
    pub fn command(
        index: u64,
        term: u64,
        session: SessionId,
        operation: OperationId,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            index,
            term,
            content: EntryContent::Command(Command {
                payload,
                session,
                operation,
            }),
        }
    }

    /// Whether this entry carries a client command
    pub fn is_command(&self) -> bool {
        matches!(self.content, EntryContent::Command(_))
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
