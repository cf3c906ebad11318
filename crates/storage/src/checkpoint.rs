// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable apply-progress checkpoints
//!
//! A checkpoint captures the applied index and the per-session dedup
//! markers in a single JSON document with a CRC32 checksum. Saves replace
//! the file atomically (temp file, fsync, rename) so a crash mid-write
//! leaves the previous checkpoint intact.

use chrono::{DateTime, Utc};
use keel_core::{OperationId, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported checkpoint version: {0}")]
    UnsupportedVersion(u32),
    #[error("checkpoint checksum mismatch")]
    ChecksumMismatch,
}

/// Durable record of apply progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,
    /// Highest applied log index; `-1` means none
    pub applied_index: i64,
    /// Highest validated operation per session
    pub sessions: BTreeMap<SessionId, OperationId>,
    /// When the checkpoint was taken
    pub taken_at: DateTime<Utc>,
    /// CRC32 checksum of the progress payload
    pub checksum: u32,
}

impl Checkpoint {
    /// Current version of the checkpoint format
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a checkpoint with computed checksum
    pub fn new(applied_index: i64, sessions: BTreeMap<SessionId, OperationId>) -> Self {
        let checksum = Self::calculate_checksum(applied_index, &sessions);
        Self {
            version: Self::CURRENT_VERSION,
            applied_index,
            sessions,
            taken_at: Utc::now(),
            checksum,
        }
    }

    /// Calculate the CRC32 checksum of the progress payload
    fn calculate_checksum(applied_index: i64, sessions: &BTreeMap<SessionId, OperationId>) -> u32 {
        // Unwrap safety: the payload only contains an i64 and a BTreeMap of
        // String-backed ids, which always serialize. BTreeMap ordering keeps
        // the serialized form deterministic.
        let json =
            serde_json::to_string(&(applied_index, sessions)).unwrap_or_else(|_| String::new());
        crc32fast::hash(json.as_bytes())
    }

    /// Verify the checksum matches the recorded progress
    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(self.applied_index, &self.sessions)
    }
}

/// Stores the latest checkpoint as a single JSON file
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Create a store writing to the given path
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Persist a checkpoint, replacing any previous one
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp)?;
        serde_json::to_writer(&mut file, checkpoint)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Load the latest checkpoint, or `None` if none was ever taken
    pub fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let checkpoint: Checkpoint = serde_json::from_str(&raw)?;
        if checkpoint.version != Checkpoint::CURRENT_VERSION {
            return Err(CheckpointError::UnsupportedVersion(checkpoint.version));
        }
        if !checkpoint.verify() {
            return Err(CheckpointError::ChecksumMismatch);
        }

        Ok(Some(checkpoint))
    }

    /// Get the path of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
