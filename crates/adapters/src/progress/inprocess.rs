// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process progress tracker

use super::ProgressTracker;
use keel_core::{OperationId, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Resolves registered waiters through oneshot channels
///
/// A waiter whose receiver was dropped is resolved silently; completion of
/// an operation nobody registered is a no-op.
#[derive(Clone, Default)]
pub struct InProcessProgress {
    waiters: Arc<Mutex<WaiterMap>>,
}

type WaiterMap = HashMap<(SessionId, OperationId), oneshot::Sender<serde_json::Value>>;

impl InProcessProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation and get a receiver for its result
    pub fn subscribe(
        &self,
        session: &SessionId,
        operation: OperationId,
    ) -> oneshot::Receiver<serde_json::Value> {
        let (tx, rx) = oneshot::channel();
        self.waiters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((session.clone(), operation), tx);
        rx
    }

    /// Number of operations still awaiting completion
    pub fn pending(&self) -> usize {
        self.waiters.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ProgressTracker for InProcessProgress {
    fn track(&self, session: &SessionId, operation: OperationId) {
        // Registration without a subscriber still marks the operation as
        // in flight; the receiver half is simply discarded.
        let _ = self.subscribe(session, operation);
    }

    fn complete(&self, session: &SessionId, operation: OperationId, result: serde_json::Value) {
        let waiter = self
            .waiters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(session.clone(), operation));

        match waiter {
            Some(tx) => {
                if tx.send(result).is_err() {
                    tracing::debug!(session = %session, operation = %operation, "waiter gone before completion");
                }
            }
            None => {
                tracing::trace!(session = %session, operation = %operation, "completion without tracked waiter");
            }
        }
    }
}

#[cfg(test)]
#[path = "inprocess_tests.rs"]
mod tests;
