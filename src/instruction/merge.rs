// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Channel-wise merging of two instructions of equal length.
//!
//! The merge walks both trees in parallel and only falls back to flat leaves
//! where no shared structure exists:
//!
//! | left \ right | Leaf          | Sequence        | Repetition      |
//! |--------------|---------------|-----------------|-----------------|
//! | Leaf         | zip           | flatten right   | flatten right   |
//! | Sequence     | flatten left  | union of bounds | split right     |
//! | Repetition   | flatten left  | split left      | common period   |
//!
//! Two repetitions are merged on a block of `lcm(period_a, period_b)` steps
//! when that block fits the [`MergeConfig`] budget. Otherwise equal periods
//! merge body against body, and anything else is flattened.

use tracing::debug;

use super::concat::concatenate;
use super::repetition::Repetition;
use super::sequence::Sequence;
use super::Instruction;
use crate::config::MergeConfig;
use crate::error::{Error, Result};

/// Merge the channels of `a` and `b` step by step.
///
/// The result has the fields of `a` followed by the fields of `b`; a scalar
/// operand contributes one field named `f{k}` after its merged position.
///
/// # Errors
///
/// - `LengthMismatch` if the lengths differ
/// - `ElementTypeMismatch` if the channel names collide
pub fn merge_channels(a: &Instruction, b: &Instruction, config: &MergeConfig) -> Result<Instruction> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        let element_type = a.element_type().merged(b.element_type())?;
        return Ok(Instruction::empty(&element_type));
    }

    match (a, b) {
        (Instruction::Leaf(x), Instruction::Leaf(y)) => Ok(Instruction::Leaf(x.merge_channels(y)?)),
        (Instruction::Leaf(x), other) => Ok(Instruction::Leaf(x.merge_channels(&other.flatten())?)),
        (other, Instruction::Leaf(y)) => Ok(Instruction::Leaf(other.flatten().merge_channels(y)?)),
        (Instruction::Sequence(x), Instruction::Sequence(y)) => merge_sequences(x, y, config),
        (Instruction::Sequence(x), Instruction::Repetition(_)) => {
            merge_along(x, b, Side::Left, config)
        }
        (Instruction::Repetition(_), Instruction::Sequence(y)) => {
            merge_along(y, a, Side::Right, config)
        }
        (Instruction::Repetition(x), Instruction::Repetition(y)) => {
            merge_repetitions(x, y, config)
        }
    }
}

/// Which operand the splitting sequence was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Split on the union of both child boundaries and merge interval by
/// interval. Each interval lies inside one child of each side.
fn merge_sequences(a: &Sequence, b: &Sequence, config: &MergeConfig) -> Result<Instruction> {
    let bounds = union_bounds(a.bounds(), b.bounds());
    let mut parts = Vec::with_capacity(bounds.len() - 1);
    for window in bounds.windows(2) {
        let (start, stop) = (window[0], window[1]);
        let left = a.sub_range(start, stop)?;
        let right = b.sub_range(start, stop)?;
        parts.push(merge_channels(&left, &right, config)?);
    }
    concatenate(parts)
}

/// Merge each child of `seq` with the matching slice of `other`.
fn merge_along(
    seq: &Sequence,
    other: &Instruction,
    side: Side,
    config: &MergeConfig,
) -> Result<Instruction> {
    let mut parts = Vec::with_capacity(seq.children().len());
    for (child, window) in seq.children().iter().zip(seq.bounds().windows(2)) {
        let piece = other.sub_range(window[0], window[1])?;
        let merged = match side {
            Side::Left => merge_channels(child, &piece, config)?,
            Side::Right => merge_channels(&piece, child, config)?,
        };
        parts.push(merged);
    }
    concatenate(parts)
}

fn merge_repetitions(a: &Repetition, b: &Repetition, config: &MergeConfig) -> Result<Instruction> {
    let (period_a, period_b) = (a.inner().len(), b.inner().len());
    let total = a.len();

    if let Some(period) = lcm(period_a, period_b) {
        let blocks = total / period;
        if period <= config.max_block_len && blocks >= config.min_block_repetitions {
            debug!(period, blocks, "merging repetitions on a common block");
            let left = a.inner().flatten().tile(period / period_a);
            let right = b.inner().flatten().tile(period / period_b);
            return Instruction::Leaf(left.merge_channels(&right)?).repeat(blocks);
        }
    }

    if period_a == period_b {
        debug!(period = period_a, count = a.count(), "merging repetition bodies");
        let body = merge_channels(a.inner(), b.inner(), config)?;
        return body.repeat(a.count());
    }

    debug!(
        total,
        period_a,
        period_b,
        max_block_len = config.max_block_len,
        "no common block within budget, flattening repetitions"
    );
    Ok(Instruction::Leaf(a.flatten().merge_channels(&b.flatten())?))
}

/// Sorted union of two prefix-sum tables with equal endpoints.
fn union_bounds(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let next = a[i].min(b[j]);
        if a[i] == next {
            i += 1;
        }
        if b[j] == next {
            j += 1;
        }
        out.push(next);
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple, `None` on overflow.
fn lcm(a: usize, b: usize) -> Option<usize> {
    (a / gcd(a, b)).checked_mul(b)
}
