// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submitter progress tracking
//!
//! Submitters register an operation before replication; the apply loop
//! resolves it with the dispatch result once the operation is applied.

mod inprocess;

pub use inprocess::InProcessProgress;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProgress, ProgressCall};

use keel_core::{OperationId, SessionId};

/// Unblocks submitters once their operation is applied
pub trait ProgressTracker: Clone + Send + Sync + 'static {
    /// Register interest in an operation before replication begins
    fn track(&self, session: &SessionId, operation: OperationId);

    /// Resolve a tracked operation with its dispatch result
    fn complete(&self, session: &SessionId, operation: OperationId, result: serde_json::Value);
}
