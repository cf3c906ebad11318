// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Apply-loop configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning for dispatcher batching and checkpoint cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyConfig {
    /// Entries per dispatcher batch; checkpoints snap to batch boundaries
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Minimum applied entries between durable checkpoints
    #[serde(default = "default_flush_every")]
    pub flush_every: u64,
    /// Prune in-flight cache entries once served to the apply loop
    #[serde(default = "default_clear_cache")]
    pub clear_cache: bool,
}

fn default_batch_size() -> u64 {
    16
}

fn default_flush_every() -> u64 {
    10
}

fn default_clear_cache() -> bool {
    true
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            flush_every: default_flush_every(),
            clear_cache: default_clear_cache(),
        }
    }
}

impl ApplyConfig {
    /// Parse from TOML, falling back to defaults for missing fields
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.flush_every == 0 {
            return Err(ConfigError::Invalid(
                "flush_every must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
