// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for sequencer unit tests.

use crate::instruction::{leaf, Instruction, Leaf};

/// Scalar `i32` instruction from a slice.
pub fn ints(values: &[i32]) -> Instruction {
    leaf(values.to_vec()).expect("i32 values are always valid")
}

/// Scalar `i32` leaf node from a slice.
pub fn int_leaf(values: &[i32]) -> Leaf {
    Leaf::new(values.to_vec()).expect("i32 values are always valid")
}

/// Flattened values of a scalar instruction, converted to `i32`.
pub fn flat_values(instruction: &Instruction) -> Vec<i32> {
    let flat = instruction.flatten();
    assert_eq!(flat.width(), 1, "expected a single-channel instruction");
    flat.columns()[0].to_vec::<i32>()
}
