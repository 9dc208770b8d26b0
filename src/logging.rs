// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup for applications embedding the sequencer.
//!
//! The library itself only emits `tracing` events. Hosts that have no
//! subscriber of their own can install one from a [`LoggingConfig`]:
//!
//! ```no_run
//! use qubit_os_sequencer::{logging, Config};
//!
//! let config = Config::load(None)?;
//! config.validate()?;
//! logging::init_logging(&config.logging)?;
//! # Ok::<(), qubit_os_sequencer::Error>(())
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`.
///
/// # Errors
///
/// Returns `Error::Config` if the level is not a valid filter, the format is
/// unknown or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level)?;

    let (json, pretty) = match config.format.as_str() {
        "json" => (Some(fmt::layer().json().with_target(true)), None),
        "pretty" => (None, Some(fmt::layer().with_target(true))),
        other => {
            return Err(Error::Config(format!("unknown log format '{other}'")));
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to install subscriber: {e}")))
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| Error::Config(format!("invalid log level '{level}': {e}"))),
    }
}
