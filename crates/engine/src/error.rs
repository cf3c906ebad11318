// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the apply process

use crate::ReadError;
use keel_adapters::DispatchError;
use keel_core::CursorError;
use keel_storage::CheckpointError;
use thiserror::Error;

/// Errors that can occur in the apply process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("process already started")]
    AlreadyStarted,
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("cursor error: {0}")]
    Cursor(#[from] CursorError),
}
