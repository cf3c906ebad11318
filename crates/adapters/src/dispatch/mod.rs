// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command dispatch
//!
//! A dispatcher executes committed command payloads against local state.
//! One dispatcher instance spans one batch; its effects become durable
//! when the batch is closed, which amortizes the commit cost across the
//! batch's commands.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DispatchCall, FakeDispatcher, FakeDispatcherHost};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from command dispatch
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch failed at index {index}: {reason}")]
    Failed { index: u64, reason: String },
    #[error("batch could not be opened: {0}")]
    BatchOpen(String),
    #[error("batch close failed: {0}")]
    BatchClose(String),
}

/// Executes one batch of committed commands
#[async_trait]
pub trait CommandDispatcher: Send {
    /// Execute one command's effect at the given log index
    ///
    /// The returned value is the command's result, forwarded to whoever
    /// is waiting on the operation's completion.
    async fn dispatch(
        &mut self,
        payload: &[u8],
        index: u64,
    ) -> Result<serde_json::Value, DispatchError>;

    /// Finalize the batch, committing its effects
    async fn close(&mut self) -> Result<(), DispatchError>;
}

/// State-machine host handing out one dispatcher per batch
#[async_trait]
pub trait DispatcherHost: Clone + Send + Sync + 'static {
    type Dispatcher: CommandDispatcher;

    /// Open a new batch
    async fn begin_batch(&self) -> Result<Self::Dispatcher, DispatchError>;
}
