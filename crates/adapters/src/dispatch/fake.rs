// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake dispatcher for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CommandDispatcher, DispatchError, DispatcherHost};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded dispatcher interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchCall {
    BatchOpened,
    Dispatched { payload: Vec<u8>, index: u64 },
    BatchClosed,
}

/// Fake dispatcher host for testing
///
/// Records batch opens, dispatches, and closes across all dispatchers it
/// hands out, and can inject a dispatch failure at a chosen log index.
#[derive(Clone, Default)]
pub struct FakeDispatcherHost {
    calls: Arc<Mutex<Vec<DispatchCall>>>,
    fail_at: Arc<Mutex<Option<u64>>>,
}

impl FakeDispatcherHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make dispatch fail at the given log index
    pub fn fail_at(&self, index: u64) {
        *self.fail_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(index);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Payloads in dispatch order
    pub fn dispatched(&self) -> Vec<Vec<u8>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DispatchCall::Dispatched { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// Log indices in dispatch order
    pub fn dispatched_indices(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DispatchCall::Dispatched { index, .. } => Some(index),
                _ => None,
            })
            .collect()
    }

    /// Number of batches opened
    pub fn opens(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, DispatchCall::BatchOpened))
            .count()
    }

    /// Number of batches closed
    pub fn closes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, DispatchCall::BatchClosed))
            .count()
    }

    fn record(&self, call: DispatchCall) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

#[async_trait]
impl DispatcherHost for FakeDispatcherHost {
    type Dispatcher = FakeDispatcher;

    async fn begin_batch(&self) -> Result<Self::Dispatcher, DispatchError> {
        self.record(DispatchCall::BatchOpened);
        Ok(FakeDispatcher { host: self.clone() })
    }
}

/// Fake per-batch dispatcher handed out by [`FakeDispatcherHost`]
pub struct FakeDispatcher {
    host: FakeDispatcherHost,
}

#[async_trait]
impl CommandDispatcher for FakeDispatcher {
    async fn dispatch(
        &mut self,
        payload: &[u8],
        index: u64,
    ) -> Result<serde_json::Value, DispatchError> {
        let fail_at = *self.host.fail_at.lock().unwrap_or_else(|e| e.into_inner());
        if fail_at == Some(index) {
            return Err(DispatchError::Failed {
                index,
                reason: "injected failure".to_string(),
            });
        }

        self.host.record(DispatchCall::Dispatched {
            payload: payload.to_vec(),
            index,
        });
        Ok(serde_json::json!({ "applied": index }))
    }

    async fn close(&mut self) -> Result<(), DispatchError> {
        self.host.record(DispatchCall::BatchClosed);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
