// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake progress tracker for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::ProgressTracker;
use keel_core::{OperationId, SessionId};
use std::sync::{Arc, Mutex};

/// Recorded progress interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressCall {
    Tracked {
        session: SessionId,
        operation: OperationId,
    },
    Completed {
        session: SessionId,
        operation: OperationId,
        result: serde_json::Value,
    },
}

/// Fake progress tracker for testing
#[derive(Clone, Default)]
pub struct FakeProgress {
    calls: Arc<Mutex<Vec<ProgressCall>>>,
}

impl FakeProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProgressCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Completed `(session, operation)` pairs in completion order
    pub fn completions(&self) -> Vec<(SessionId, OperationId)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProgressCall::Completed {
                    session, operation, ..
                } => Some((session, operation)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ProgressCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

impl ProgressTracker for FakeProgress {
    fn track(&self, session: &SessionId, operation: OperationId) {
        self.record(ProgressCall::Tracked {
            session: session.clone(),
            operation,
        });
    }

    fn complete(&self, session: &SessionId, operation: OperationId, result: serde_json::Value) {
        self.record(ProgressCall::Completed {
            session: session.clone(),
            operation,
            result,
        });
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
