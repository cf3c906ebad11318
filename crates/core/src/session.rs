// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client session identity and per-session deduplication
//!
//! A session is the stable identity under which a client retries the same
//! logical request. The tracker records the highest operation id validated
//! per session; anything at or below that marker is a retry of work already
//! dispatched.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Stable identity of one client session across retries
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a session id from an existing identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh session identity
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-session sequence number assigned by the submitter
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct OperationId(pub u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verdict for one delivered operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// First delivery of this operation; safe to dispatch
    Fresh,
    /// Already validated in an earlier delivery; must not dispatch again
    Duplicate,
}

/// Tracks the highest validated operation per session
///
/// The recorded marker never moves backward: an older duplicate arriving
/// after a newer id was recorded leaves the marker untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    latest: HashMap<SessionId, OperationId>,
}

impl SessionTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tracker from checkpointed markers
    pub fn restore(markers: BTreeMap<SessionId, OperationId>) -> Self {
        Self {
            latest: markers.into_iter().collect(),
        }
    }

    /// Classify one delivered operation, recording it when fresh
    ///
    /// An operation is fresh only when strictly greater than the recorded
    /// marker for its session; duplicates leave the tracker unchanged.
    pub fn validate(&mut self, session: &SessionId, operation: OperationId) -> Validation {
        match self.latest.get(session) {
            Some(last) if operation <= *last => {
                tracing::trace!(session = %session, operation = %operation, "duplicate operation");
                Validation::Duplicate
            }
            _ => {
                self.latest.insert(session.clone(), operation);
                Validation::Fresh
            }
        }
    }

    /// Highest validated operation for a session, if any
    pub fn latest(&self, session: &SessionId) -> Option<OperationId> {
        self.latest.get(session).copied()
    }

    /// Copy of the marker map for checkpointing
    ///
    /// BTreeMap so the persisted form is deterministically ordered.
    pub fn snapshot(&self) -> BTreeMap<SessionId, OperationId> {
        self.latest
            .iter()
            .map(|(session, operation)| (session.clone(), *operation))
            .collect()
    }

    /// Number of sessions with a recorded marker
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    /// Whether any session has been recorded
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
