// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Canonical concatenation.
//!
//! Every sequence the crate builds goes through [`concatenate`], which keeps
//! trees in normal form:
//!
//! - nested sequences are spliced into their parent
//! - empty parts are dropped
//! - adjacent leaves are joined into one leaf
//! - adjacent runs of one body are coalesced (`n * x + m * x` is
//!   `(n + m) * x`, and `n * x + x` is `(n + 1) * x`)
//! - zero parts give an empty leaf and one part is returned as is

use std::ops::{Add, Mul};

use super::leaf::Leaf;
use super::repetition::Repetition;
use super::element::ElementType;
use super::sequence::Sequence;
use super::Instruction;
use crate::error::{Error, Result};

/// Join instructions end to end.
///
/// # Errors
///
/// - `InvalidSequence` if `instructions` is empty
/// - `ElementTypeMismatch` if the parts disagree on element type
pub fn concatenate<I>(instructions: I) -> Result<Instruction>
where
    I: IntoIterator<Item = Instruction>,
{
    let instructions: Vec<Instruction> = instructions.into_iter().collect();
    let element_type = match instructions.first() {
        Some(first) => first.element_type().clone(),
        None => {
            return Err(Error::InvalidSequence(
                "nothing to concatenate".into(),
            ))
        }
    };
    if let Some(other) = instructions
        .iter()
        .find(|i| i.element_type() != &element_type)
    {
        return Err(Error::ElementTypeMismatch(format!(
            "cannot concatenate {element_type} with {}",
            other.element_type()
        )));
    }

    let mut runs: Vec<Instruction> = Vec::with_capacity(instructions.len());
    for instruction in instructions {
        match instruction {
            Instruction::Sequence(seq) => {
                for child in seq.children() {
                    push_run(&mut runs, child.clone(), &element_type)?;
                }
            }
            other if other.is_empty() => {}
            other => push_run(&mut runs, other, &element_type)?,
        }
    }

    if runs.len() < 2 {
        return Ok(runs
            .pop()
            .unwrap_or_else(|| Instruction::empty(&element_type)));
    }
    Ok(Instruction::Sequence(Sequence::new(runs)?))
}

/// Append `next`, joining it to the last run when both are leaves or both
/// loop one body.
fn push_run(
    runs: &mut Vec<Instruction>,
    next: Instruction,
    element_type: &ElementType,
) -> Result<()> {
    if let Some(last) = runs.last_mut() {
        if let (Instruction::Leaf(left), Instruction::Leaf(right)) = (&*last, &next) {
            let joined = Leaf::concat(element_type, &[left.clone(), right.clone()]);
            *last = Instruction::Leaf(joined);
            return Ok(());
        }
        if let Some(joined) = join_runs(last, &next)? {
            *last = joined;
            return Ok(());
        }
    }
    runs.push(next);
    Ok(())
}

fn join_runs(left: &Instruction, right: &Instruction) -> Result<Option<Instruction>> {
    let (left_body, left_count) = run_of(left);
    let (right_body, right_count) = run_of(right);
    // Length first, so unequal bodies are rejected without a deep compare.
    if left_body.len() != right_body.len() || left_body != right_body {
        return Ok(None);
    }
    let count = left_count.checked_add(right_count).ok_or_else(|| {
        Error::InvalidRepetition(format!(
            "count overflows usize: {left_count} + {right_count}"
        ))
    })?;
    Ok(Some(Instruction::Repetition(Repetition::new(
        count,
        left_body.clone(),
    )?)))
}

/// `(body, count)` viewing a non-repetition as a single run.
fn run_of(instruction: &Instruction) -> (&Instruction, usize) {
    match instruction {
        Instruction::Repetition(rep) => (rep.inner(), rep.count()),
        other => (other, 1),
    }
}

impl Add for Instruction {
    type Output = Result<Instruction>;

    fn add(self, rhs: Instruction) -> Self::Output {
        concatenate([self, rhs])
    }
}

impl Add for &Instruction {
    type Output = Result<Instruction>;

    fn add(self, rhs: &Instruction) -> Self::Output {
        concatenate([self.clone(), rhs.clone()])
    }
}

impl Mul<usize> for Instruction {
    type Output = Result<Instruction>;

    fn mul(self, count: usize) -> Self::Output {
        self.repeat(count)
    }
}

impl Mul<usize> for &Instruction {
    type Output = Result<Instruction>;

    fn mul(self, count: usize) -> Self::Output {
        self.repeat(count)
    }
}
