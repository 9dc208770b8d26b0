// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ordered playback of several instructions.
//!
//! A [`Sequence`] keeps its children behind an `Arc` together with a
//! prefix-sum table of their lengths: `bounds[k]` is the first step of child
//! `k` and `bounds[k + 1]` one past its last step. Lookups by time index are
//! a binary search over that table.

use std::sync::Arc;

use super::concat::concatenate;
use super::element::{ElementType, Value};
use super::leaf::Leaf;
use super::Instruction;
use crate::error::{Error, Result};

/// Concatenation of two or more non-empty instructions of one element type.
///
/// Children are never sequences themselves. Build with `+` or
/// [`concatenate`]; the constructor is internal.
#[derive(Debug, Clone)]
pub struct Sequence {
    node: Arc<SequenceNode>,
}

#[derive(Debug)]
struct SequenceNode {
    children: Vec<Instruction>,
    bounds: Vec<usize>,
    element_type: ElementType,
    depth: usize,
}

impl Sequence {
    /// Validate and build. Nested sequences are spliced in place.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSequence` if fewer than two children remain, a child
    /// is empty, the element types differ or the total length overflows.
    pub(crate) fn new(children: Vec<Instruction>) -> Result<Self> {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Instruction::Sequence(seq) => flat.extend(seq.children().iter().cloned()),
                other => flat.push(other),
            }
        }
        if flat.len() < 2 {
            return Err(Error::InvalidSequence(format!(
                "needs at least 2 children, got {}",
                flat.len()
            )));
        }

        let element_type = flat[0].element_type().clone();
        let mut bounds = Vec::with_capacity(flat.len() + 1);
        bounds.push(0usize);
        let mut depth = 0;
        for (index, child) in flat.iter().enumerate() {
            if child.is_empty() {
                return Err(Error::InvalidSequence(format!("child {index} is empty")));
            }
            if child.element_type() != &element_type {
                return Err(Error::InvalidSequence(format!(
                    "child {index} has type {}, expected {element_type}",
                    child.element_type()
                )));
            }
            let end = bounds[index].checked_add(child.len()).ok_or_else(|| {
                Error::InvalidSequence("total length overflows usize".into())
            })?;
            bounds.push(end);
            depth = depth.max(child.depth());
        }

        Ok(Self {
            node: Arc::new(SequenceNode {
                children: flat,
                bounds,
                element_type,
                depth: depth + 1,
            }),
        })
    }

    pub fn children(&self) -> &[Instruction] {
        &self.node.children
    }

    /// Prefix sums of child lengths, starting at 0 and ending at `len()`.
    pub fn bounds(&self) -> &[usize] {
        &self.node.bounds
    }

    pub fn len(&self) -> usize {
        self.node.bounds.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> &ElementType {
        &self.node.element_type
    }

    pub fn depth(&self) -> usize {
        self.node.depth
    }

    /// Index of the child that plays step `index`.
    fn child_index(&self, index: usize) -> usize {
        self.node.bounds.partition_point(|&bound| bound <= index) - 1
    }

    pub(crate) fn value_at(&self, index: usize) -> Value {
        let k = self.child_index(index);
        self.node.children[k].value_at(index - self.node.bounds[k])
    }

    /// Instruction over `[start, stop)`; bounds are already normalized.
    ///
    /// Children entirely inside the range are reused as they are; only the
    /// two boundary children are sliced.
    pub(crate) fn sub_range(&self, start: usize, stop: usize) -> Result<Instruction> {
        if start >= stop {
            return Ok(Instruction::empty(self.element_type()));
        }
        if start == 0 && stop == self.len() {
            return Ok(Instruction::Sequence(self.clone()));
        }
        let bounds = &self.node.bounds;
        let children = &self.node.children;
        let first = self.child_index(start);
        let last = self.child_index(stop - 1);
        if first == last {
            let offset = bounds[first];
            return children[first].sub_range(start - offset, stop - offset);
        }

        let mut parts = Vec::with_capacity(last - first + 1);
        parts.push(children[first].sub_range(start - bounds[first], bounds[first + 1] - bounds[first])?);
        parts.extend(children[first + 1..last].iter().cloned());
        parts.push(children[last].sub_range(0, stop - bounds[last])?);
        concatenate(parts)
    }

    pub(crate) fn flatten(&self) -> Leaf {
        let parts: Vec<Leaf> = self.node.children.iter().map(Instruction::flatten).collect();
        Leaf::concat(self.element_type(), &parts)
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node) || self.node.children == other.node.children
    }
}
