// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Looping playback of one instruction.

use std::sync::Arc;

use super::concat::concatenate;
use super::element::{ElementType, Value};
use super::leaf::Leaf;
use super::Instruction;
use crate::error::{Error, Result};

/// An instruction played back `count` times in a row.
///
/// `count` is at least 2, the body is non-empty and is never itself a
/// repetition. The body is shared, so `clone` and slicing are cheap no
/// matter how large `count` is.
#[derive(Debug, Clone)]
pub struct Repetition {
    count: usize,
    inner: Arc<Instruction>,
    len: usize,
}

impl Repetition {
    /// Validate and build. A repeated repetition is folded into one loop.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRepetition` if `count < 2`, the body is empty or the
    /// total length overflows.
    pub(crate) fn new(count: usize, inner: Instruction) -> Result<Self> {
        if count < 2 {
            return Err(Error::InvalidRepetition(format!(
                "count must be at least 2, got {count}"
            )));
        }
        if inner.is_empty() {
            return Err(Error::InvalidRepetition(
                "repeated instruction is empty".into(),
            ));
        }
        let (count, inner) = match inner {
            Instruction::Repetition(rep) => {
                let count = count.checked_mul(rep.count).ok_or_else(|| {
                    Error::InvalidRepetition(format!(
                        "count overflows usize: {count} * {}",
                        rep.count
                    ))
                })?;
                (count, rep.inner)
            }
            other => (count, Arc::new(other)),
        };
        let len = inner.len().checked_mul(count).ok_or_else(|| {
            Error::InvalidRepetition(format!(
                "length overflows usize: {count} * {}",
                inner.len()
            ))
        })?;
        Ok(Self { count, inner, len })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// The repeated body.
    pub fn inner(&self) -> &Instruction {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn element_type(&self) -> &ElementType {
        self.inner.element_type()
    }

    pub fn depth(&self) -> usize {
        1 + self.inner.depth()
    }

    pub(crate) fn value_at(&self, index: usize) -> Value {
        self.inner.value_at(index % self.inner.len())
    }

    /// Instruction over `[start, stop)`; bounds are already normalized.
    ///
    /// The result is a partial body, a shorter loop of whole bodies and a
    /// partial body, each part omitted when empty.
    pub(crate) fn sub_range(&self, start: usize, stop: usize) -> Result<Instruction> {
        if start >= stop {
            return Ok(Instruction::empty(self.element_type()));
        }
        if start == 0 && stop == self.len {
            return Ok(Instruction::Repetition(self.clone()));
        }
        let period = self.inner.len();
        let first_whole = start.div_ceil(period);
        let last_whole = stop / period;
        if first_whole > last_whole {
            // Both ends fall inside one period.
            let offset = (start / period) * period;
            return self.inner.sub_range(start - offset, stop - offset);
        }

        let prefix = if start % period == 0 {
            Instruction::empty(self.element_type())
        } else {
            self.inner.sub_range(start % period, period)?
        };
        let middle = self.inner.repeat(last_whole - first_whole)?;
        let suffix = self.inner.sub_range(0, stop - last_whole * period)?;
        concatenate([prefix, middle, suffix])
    }

    pub(crate) fn flatten(&self) -> Leaf {
        self.inner.flatten().tile(self.count)
    }
}

impl PartialEq for Repetition {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
            && (Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::leaf;

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn test_new_rejects_small_count() {
        for count in [0, 1] {
            let result = Repetition::new(count, leaf(vec![1]).unwrap());
            assert!(matches!(result, Err(Error::InvalidRepetition(_))));
        }
    }

    #[test]
    fn test_new_rejects_empty_body() {
        let result = Repetition::new(3, leaf(Vec::<u8>::new()).unwrap());
        assert!(matches!(result, Err(Error::InvalidRepetition(msg)) if msg.contains("empty")));
    }

    #[test]
    fn test_new_folds_nested_repetition() {
        let inner = Repetition::new(3, leaf(vec![1, 2]).unwrap()).unwrap();
        let outer = Repetition::new(4, Instruction::Repetition(inner)).unwrap();
        assert_eq!(outer.count(), 12);
        assert_eq!(outer.len(), 24);
        assert_eq!(outer.depth(), 1);
        assert!(matches!(outer.inner(), Instruction::Leaf(_)));
    }

    #[test]
    fn test_new_rejects_overflow() {
        let inner = Repetition::new(usize::MAX / 2, leaf(vec![1]).unwrap()).unwrap();
        let result = Repetition::new(3, Instruction::Repetition(inner));
        assert!(matches!(result, Err(Error::InvalidRepetition(_))));

        let result = Repetition::new(usize::MAX, leaf(vec![1, 2]).unwrap());
        assert!(matches!(result, Err(Error::InvalidRepetition(_))));
    }

    // =========================================================================
    // Access
    // =========================================================================

    #[test]
    fn test_value_at_wraps() {
        let rep = Repetition::new(1_000_000, leaf(vec![1, 2, 3]).unwrap()).unwrap();
        assert_eq!(rep.value_at(0), Value::from(1));
        assert_eq!(rep.value_at(2_999_998), Value::from(2));
    }

    #[test]
    fn test_sub_range_prefix_loop_suffix() {
        let rep = Repetition::new(5, leaf(vec![0, 1, 2]).unwrap()).unwrap();
        let sliced = rep.sub_range(2, 13).unwrap();
        assert_eq!(sliced.len(), 11);
        let expected = concatenate([
            leaf(vec![2]).unwrap(),
            (leaf(vec![0, 1, 2]).unwrap() * 3).unwrap(),
            leaf(vec![0]).unwrap(),
        ])
        .unwrap();
        assert_eq!(sliced, expected);
    }

    #[test]
    fn test_sub_range_inside_one_period() {
        let rep = Repetition::new(5, leaf(vec![0, 1, 2, 3]).unwrap()).unwrap();
        assert_eq!(rep.sub_range(5, 7).unwrap(), leaf(vec![1, 2]).unwrap());
    }

    #[test]
    fn test_sub_range_whole_periods() {
        let rep = Repetition::new(5, leaf(vec![0, 1]).unwrap()).unwrap();
        let sliced = rep.sub_range(2, 8).unwrap();
        let Instruction::Repetition(sliced) = sliced else {
            panic!("expected a repetition");
        };
        assert_eq!(sliced.count(), 3);
    }

    #[test]
    fn test_flatten() {
        let rep = Repetition::new(3, leaf(vec![true, false]).unwrap()).unwrap();
        assert_eq!(
            rep.flatten(),
            Leaf::new(vec![true, false, true, false, true, false]).unwrap()
        );
    }
}
