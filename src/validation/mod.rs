// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Index and slice validation for instruction access.
//!
//! Indices follow the usual sequence convention: a negative index counts
//! from the end. After normalization an element index must lie in
//! `[0, length)` and a slice bound in `[0, length]`.

use crate::error::{Error, Result};

/// Normalize an element index.
pub fn normalize_index(index: i64, length: usize) -> Result<usize> {
    let normalized = if index < 0 {
        length as i128 + index as i128
    } else {
        index as i128
    };
    if !(0..length as i128).contains(&normalized) {
        return Err(Error::IndexOutOfBounds { index, length });
    }
    Ok(normalized as usize)
}

/// Normalize a slice bound; `length` itself is accepted.
pub fn normalize_bound(index: i64, length: usize) -> Result<usize> {
    let normalized = if index < 0 {
        length as i128 + index as i128
    } else {
        index as i128
    };
    if !(0..=length as i128).contains(&normalized) {
        return Err(Error::IndexOutOfBounds { index, length });
    }
    Ok(normalized as usize)
}

/// Normalize `[start:stop:step]` into a unit-stride `(start, stop)` pair.
///
/// Missing bounds default to the full range. A reversed range is clamped
/// to an empty one at `start`. Any step other than 1 is rejected.
pub fn normalize_slice(
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
    length: usize,
) -> Result<(usize, usize)> {
    let step = step.unwrap_or(1);
    if step != 1 {
        return Err(Error::UnsupportedSlice { step });
    }
    let start = match start {
        Some(index) => normalize_bound(index, length)?,
        None => 0,
    };
    let stop = match stop {
        Some(index) => normalize_bound(index, length)?,
        None => length,
    };
    Ok((start, stop.max(start)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Element indices
    // =========================================================================

    #[test]
    fn test_normalize_index_positive() {
        assert_eq!(normalize_index(3, 5).unwrap(), 3);
    }

    #[test]
    fn test_normalize_index_negative() {
        assert_eq!(normalize_index(-1, 5).unwrap(), 4);
        assert_eq!(normalize_index(-5, 5).unwrap(), 0);
    }

    #[test]
    fn test_normalize_index_out_of_bounds() {
        assert!(matches!(
            normalize_index(5, 5),
            Err(Error::IndexOutOfBounds {
                index: 5,
                length: 5
            })
        ));
        assert!(normalize_index(-6, 5).is_err());
        assert!(normalize_index(0, 0).is_err());
    }

    #[test]
    fn test_normalize_index_extreme_values() {
        assert!(normalize_index(i64::MIN, 10).is_err());
        assert!(normalize_index(i64::MAX, 10).is_err());
    }

    // =========================================================================
    // Slices
    // =========================================================================

    #[test]
    fn test_normalize_bound_accepts_length() {
        assert_eq!(normalize_bound(5, 5).unwrap(), 5);
        assert!(normalize_bound(6, 5).is_err());
    }

    #[test]
    fn test_normalize_slice_defaults() {
        assert_eq!(normalize_slice(None, None, None, 7).unwrap(), (0, 7));
    }

    #[test]
    fn test_normalize_slice_negative_bounds() {
        assert_eq!(normalize_slice(Some(-3), Some(-1), None, 10).unwrap(), (7, 9));
    }

    #[test]
    fn test_normalize_slice_reversed_is_empty() {
        assert_eq!(normalize_slice(Some(6), Some(2), Some(1), 10).unwrap(), (6, 6));
    }

    #[test]
    fn test_normalize_slice_rejects_step() {
        assert!(matches!(
            normalize_slice(None, None, Some(2), 10),
            Err(Error::UnsupportedSlice { step: 2 })
        ));
        assert!(matches!(
            normalize_slice(None, None, Some(-1), 10),
            Err(Error::UnsupportedSlice { step: -1 })
        ));
    }
}
