// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Compressed, time-indexed sequencer instructions.
//!
//! An [`Instruction`] describes what a group of output channels plays on
//! every tick of a sequencer clock. Instead of one array per channel, an
//! instruction is a tree of three node kinds:
//!
//! - [`Leaf`]: explicit values, one buffer per channel
//! - [`Sequence`]: children played back one after the other
//! - [`Repetition`]: one body played back `count` times
//!
//! Trees are immutable and share subtrees through `Arc`, so slicing,
//! concatenating, repeating and merging reuse existing nodes instead of
//! copying values. A repetition of a million ticks costs as much as its body.
//!
//! # Example
//!
//! ```
//! use qubit_os_sequencer::instruction::{leaf, merge_instructions};
//! use qubit_os_sequencer::config::MergeConfig;
//!
//! let ttl = (leaf(vec![true, false])? * 1000)?;
//! let dac = (leaf(vec![0.0f32, 0.5, 1.0, 0.5])? * 500)?;
//! let merged = merge_instructions([("ttl", ttl), ("dac", dac)], &MergeConfig::default())?;
//! assert_eq!(merged.len(), 2000);
//! assert_eq!(merged.depth(), 1);
//! # Ok::<(), qubit_os_sequencer::Error>(())
//! ```

mod column;
mod concat;
mod element;
mod leaf;
mod merge;
mod repetition;
mod sequence;
mod stack;

use std::fmt;
use std::ops::{Bound, RangeBounds};

use tracing::trace;

use crate::config::MergeConfig;
use crate::error::{Error, Result};
use crate::validation::{normalize_index, normalize_slice};

pub use column::{Column, Element};
pub use concat::concatenate;
pub use element::{ElementType, Field, Scalar, ScalarType, Value};
pub use leaf::Leaf;
pub use merge::merge_channels;
pub use repetition::Repetition;
pub use sequence::Sequence;
pub use stack::{merge_instructions, stack_instructions};

/// A time-indexed series of channel values.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Leaf(Leaf),
    Sequence(Sequence),
    Repetition(Repetition),
}

/// Single-channel instruction from a vector of primitives.
///
/// # Errors
///
/// Returns `InvalidValue` if a float value is NaN or infinite.
pub fn leaf<T: Element>(values: Vec<T>) -> Result<Instruction> {
    Ok(Instruction::Leaf(Leaf::new(values)?))
}

impl Instruction {
    /// Zero-length instruction of the given type.
    pub fn empty(element_type: &ElementType) -> Self {
        Instruction::Leaf(Leaf::empty(element_type))
    }

    /// Number of ticks.
    pub fn len(&self) -> usize {
        match self {
            Instruction::Leaf(leaf) => leaf.len(),
            Instruction::Sequence(seq) => seq.len(),
            Instruction::Repetition(rep) => rep.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> &ElementType {
        match self {
            Instruction::Leaf(leaf) => leaf.element_type(),
            Instruction::Sequence(seq) => seq.element_type(),
            Instruction::Repetition(rep) => rep.element_type(),
        }
    }

    /// Number of channels.
    pub fn width(&self) -> usize {
        self.element_type().width()
    }

    /// Height of the tree; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Instruction::Leaf(_) => 0,
            Instruction::Sequence(seq) => seq.depth(),
            Instruction::Repetition(rep) => rep.depth(),
        }
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// Value at `index`; negative indices count from the end.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` unless `-len <= index < len`.
    pub fn get(&self, index: i64) -> Result<Value> {
        let index = normalize_index(index, self.len())?;
        Ok(self.value_at(index))
    }

    pub(crate) fn value_at(&self, index: usize) -> Value {
        match self {
            Instruction::Leaf(leaf) => leaf.value_at(index),
            Instruction::Sequence(seq) => seq.value_at(index),
            Instruction::Repetition(rep) => rep.value_at(index),
        }
    }

    /// Ticks `[start, stop)`; negative bounds count from the end.
    pub fn get_range(&self, start: i64, stop: i64) -> Result<Instruction> {
        self.get_slice(Some(start), Some(stop), None)
    }

    /// Ticks `[start:stop:step]` with optional bounds.
    ///
    /// # Errors
    ///
    /// - `UnsupportedSlice` if `step` is given and is not 1
    /// - `IndexOutOfBounds` if a bound lies outside `[-len, len]`
    pub fn get_slice(
        &self,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> Result<Instruction> {
        let (start, stop) = normalize_slice(start, stop, step, self.len())?;
        self.sub_range(start, stop)
    }

    /// Ticks in `range`.
    ///
    /// ```
    /// use qubit_os_sequencer::instruction::leaf;
    ///
    /// let ramp = leaf(vec![0, 1, 2, 3, 4])?;
    /// assert_eq!(ramp.slice(1..3)?, leaf(vec![1, 2])?);
    /// assert_eq!(ramp.slice(3..)?, leaf(vec![3, 4])?);
    /// # Ok::<(), qubit_os_sequencer::Error>(())
    /// ```
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Result<Instruction> {
        let length = self.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let stop = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => length,
        };
        for bound in [start, stop] {
            if bound > length {
                return Err(Error::IndexOutOfBounds {
                    index: i64::try_from(bound).unwrap_or(i64::MAX),
                    length,
                });
            }
        }
        self.sub_range(start, stop.max(start))
    }

    /// Ticks `[start, stop)` with bounds already normalized.
    pub(crate) fn sub_range(&self, start: usize, stop: usize) -> Result<Instruction> {
        match self {
            Instruction::Leaf(leaf) => Ok(Instruction::Leaf(leaf.slice(start, stop))),
            Instruction::Sequence(seq) => seq.sub_range(start, stop),
            Instruction::Repetition(rep) => rep.sub_range(start, stop),
        }
    }

    /// Expand into one explicit leaf.
    ///
    /// Allocates the full length; prefer structural operations on long
    /// repetitions.
    pub fn flatten(&self) -> Leaf {
        match self {
            Instruction::Leaf(leaf) => leaf.clone(),
            Instruction::Sequence(seq) => {
                trace!(len = seq.len(), "flattening sequence");
                seq.flatten()
            }
            Instruction::Repetition(rep) => {
                trace!(len = rep.len(), count = rep.count(), "flattening repetition");
                rep.flatten()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Types and channels
    // -------------------------------------------------------------------------

    /// Cast every value to `target`, keeping the tree shape.
    ///
    /// # Errors
    ///
    /// Returns `ElementTypeMismatch` if `target` has a different channel
    /// layout.
    pub fn as_type(&self, target: &ElementType) -> Result<Instruction> {
        self.element_type().check_cast(target)?;
        self.apply(|leaf| leaf.as_type(target))
    }

    /// Single-channel instruction holding one named field.
    pub fn get_field(&self, name: &str) -> Result<Instruction> {
        if self.element_type().field(name).is_none() {
            return Err(Error::ElementTypeMismatch(format!(
                "no field '{name}' in {}",
                self.element_type()
            )));
        }
        self.apply(|leaf| leaf.get_field(name))
    }

    /// One-field record wrapping this scalar instruction.
    pub fn with_name(&self, name: &str) -> Result<Instruction> {
        if self.element_type().is_record() {
            return Err(Error::ElementTypeMismatch(format!(
                "cannot name a record instruction of type {}",
                self.element_type()
            )));
        }
        self.apply(|leaf| leaf.with_name(name))
    }

    /// Map every leaf through `f`, keeping the tree shape.
    ///
    /// `f` must preserve leaf lengths and map every leaf to the same element
    /// type.
    ///
    /// # Errors
    ///
    /// - `LengthMismatch` if `f` changes a leaf's length
    /// - `ElementTypeMismatch` if leaves map to different types
    /// - any error returned by `f`
    pub fn apply<F>(&self, f: F) -> Result<Instruction>
    where
        F: Fn(&Leaf) -> Result<Leaf>,
    {
        self.apply_with(&f)
    }

    fn apply_with<F>(&self, f: &F) -> Result<Instruction>
    where
        F: Fn(&Leaf) -> Result<Leaf>,
    {
        match self {
            Instruction::Leaf(leaf) => Ok(Instruction::Leaf(leaf.apply(f)?)),
            Instruction::Sequence(seq) => {
                let children = seq
                    .children()
                    .iter()
                    .map(|child| child.apply_with(f))
                    .collect::<Result<Vec<_>>>()?;
                concatenate(children)
            }
            Instruction::Repetition(rep) => {
                let inner = rep.inner().apply_with(f)?;
                Ok(Instruction::Repetition(Repetition::new(rep.count(), inner)?))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Composition
    // -------------------------------------------------------------------------

    /// `self` followed by `other`.
    pub fn concat(&self, other: &Instruction) -> Result<Instruction> {
        concatenate([self.clone(), other.clone()])
    }

    /// `self` played back `count` times.
    ///
    /// A count of 0 gives an empty instruction and 1 gives `self`.
    pub fn repeat(&self, count: usize) -> Result<Instruction> {
        match count {
            0 => Ok(Instruction::empty(self.element_type())),
            1 => Ok(self.clone()),
            _ if self.is_empty() => Ok(self.clone()),
            _ => Ok(Instruction::Repetition(Repetition::new(count, self.clone())?)),
        }
    }

    /// Channel-wise merge with the default [`MergeConfig`].
    pub fn merge_channels(&self, other: &Instruction) -> Result<Instruction> {
        merge_channels(self, other, &MergeConfig::default())
    }

    pub fn merge_channels_with(&self, other: &Instruction, config: &MergeConfig) -> Result<Instruction> {
        merge_channels(self, other, config)
    }
}

impl From<Leaf> for Instruction {
    fn from(leaf: Leaf) -> Self {
        Instruction::Leaf(leaf)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Leaf(leaf) => write!(f, "{leaf}"),
            Instruction::Sequence(seq) => {
                for (index, child) in seq.children().iter().enumerate() {
                    if index > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            Instruction::Repetition(rep) => match rep.inner() {
                Instruction::Sequence(_) => write!(f, "{} * ({})", rep.count(), rep.inner()),
                inner => write!(f, "{} * {inner}", rep.count()),
            },
        }
    }
}
