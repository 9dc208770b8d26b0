// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Sequencer Instructions
//!
//! This crate provides the instruction model used to program multi-channel
//! hardware sequencers: a compact, immutable description of what every
//! output channel plays on each tick of the sequencer clock.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Instruction                 │
//! ├─────────────┬─────────────┬─────────────┤
//! │    Leaf     │  Sequence   │ Repetition  │
//! │  (columns)  │  (bounds)   │ (count, Arc)│
//! ├─────────────┴─────────────┴─────────────┤
//! │  concatenate  ·  merge  ·  stack         │
//! ├─────────────────────────────────────────┤
//! │      Column buffers (ndarray, Arc)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`instruction`]: Instruction trees and their operations
//! - [`config`]: Configuration management
//! - [`logging`]: Tracing subscriber setup
//! - [`validation`]: Index and slice normalization
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod instruction;
pub mod logging;
pub mod validation;

pub use config::{Config, MergeConfig};
pub use error::{Error, Result};
pub use instruction::{leaf, Instruction};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
