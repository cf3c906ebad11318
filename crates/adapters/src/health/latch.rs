// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process health latch

use super::HealthMonitor;
use std::sync::{Arc, Mutex};

/// Sticky health latch recording the first failure cause
#[derive(Clone, Default)]
pub struct HealthLatch {
    cause: Arc<Mutex<Option<String>>>,
}

impl HealthLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// First recorded cause, if the latch has tripped
    pub fn cause(&self) -> Option<String> {
        self.cause.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Clear the latch
    ///
    /// An explicit operator/restart action; nothing in the apply pipeline
    /// calls this.
    pub fn reset(&self) {
        *self.cause.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl HealthMonitor for HealthLatch {
    fn panic(&self, cause: &str) {
        let mut guard = self.cause.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(first) => {
                tracing::warn!(cause, first, "panic while already unhealthy");
            }
            None => {
                tracing::error!(cause, "node latched unhealthy");
                *guard = Some(cause.to_string());
            }
        }
    }

    fn is_healthy(&self) -> bool {
        self.cause
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

#[cfg(test)]
#[path = "latch_tests.rs"]
mod tests;
