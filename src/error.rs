// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for instruction construction and access.

use std::fmt;

/// Result type alias for sequencer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Sequencer error types.
///
/// Instruction errors are synchronous and local: they report a construction
/// or access request that cannot be satisfied, never a transient fault.
#[derive(Debug)]
pub enum Error {
    /// Index outside the normalized valid range
    IndexOutOfBounds { index: i64, length: usize },
    /// Repetition count below 2, empty body or length overflow
    InvalidRepetition(String),
    /// Too few children, an empty child or mismatched children
    InvalidSequence(String),
    /// Incompatible channel schemas
    ElementTypeMismatch(String),
    /// Slice with a step other than 1
    UnsupportedSlice { step: i64 },
    /// Operands that must share a time grid have different lengths
    LengthMismatch { left: usize, right: usize },
    /// Value rejected at leaf construction
    InvalidValue(String),
    /// Configuration error
    Config(String),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IndexOutOfBounds { index, length } => {
                write!(f, "Index {} is out of bounds for length {}", index, length)
            }
            Error::InvalidRepetition(msg) => write!(f, "Invalid repetition: {}", msg),
            Error::InvalidSequence(msg) => write!(f, "Invalid sequence: {}", msg),
            Error::ElementTypeMismatch(msg) => write!(f, "Element type mismatch: {}", msg),
            Error::UnsupportedSlice { step } => {
                write!(f, "Unsupported slice: step must be 1, got {}", step)
            }
            Error::LengthMismatch { left, right } => {
                write!(f, "Length mismatch: {} != {}", left, right)
            }
            Error::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
