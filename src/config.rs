// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the sequencer.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. sequencer.yaml file
//! 3. Environment variables (QUBITOS_*)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};

/// Block lengths above this are accepted but can allocate a lot per merge.
const LARGE_BLOCK_LEN: usize = 1 << 24;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Structural merge settings
    #[serde(default)]
    pub merge: MergeConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        } else {
            for path in &["sequencer.yaml", "sequencer.yml", "/etc/qubitos/sequencer.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    config = Self::from_file(path)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Apply environment variable overrides. Unparsable numbers are ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUBITOS_SEQ_MAX_BLOCK_LEN") {
            if let Ok(len) = val.trim().parse() {
                self.merge.max_block_len = len;
            }
        }
        if let Ok(val) = env::var("QUBITOS_SEQ_MIN_BLOCK_REPETITIONS") {
            if let Ok(count) = val.trim().parse() {
                self.merge.min_block_repetitions = count;
            }
        }
        if let Ok(val) = env::var("QUBITOS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_LOG_FORMAT") {
            self.logging.format = val.to_lowercase();
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.merge.validate()?;
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(Error::Config(format!(
                "unknown log format '{}', expected json or pretty",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// Budget for merging two repetitions on a common block.
///
/// Two repetitions with body lengths `p` and `q` are merged on a flattened
/// block of `lcm(p, q)` ticks, repeated. The block is only built when it is
/// at most `max_block_len` ticks long and would be repeated at least
/// `min_block_repetitions` times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Longest block materialized for a repetition merge
    #[serde(default = "default_max_block_len")]
    pub max_block_len: usize,

    /// Fewest block repetitions worth building a block for
    #[serde(default = "default_min_block_repetitions")]
    pub min_block_repetitions: usize,
}

impl MergeConfig {
    /// Validate the budget.
    pub fn validate(&self) -> Result<()> {
        if self.max_block_len == 0 {
            return Err(Error::Config("max_block_len cannot be 0".into()));
        }
        if self.min_block_repetitions < 2 {
            return Err(Error::Config(format!(
                "min_block_repetitions must be at least 2, got {}",
                self.min_block_repetitions
            )));
        }
        if self.max_block_len > LARGE_BLOCK_LEN {
            tracing::warn!(
                max_block_len = self.max_block_len,
                "Large merge block budget. A single repetition merge may allocate \
                 this many ticks per channel."
            );
        }
        Ok(())
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            max_block_len: default_max_block_len(),
            min_block_repetitions: default_min_block_repetitions(),
        }
    }
}

fn default_max_block_len() -> usize {
    65_536
}

fn default_min_block_repetitions() -> usize {
    2
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}
