// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Merging many channels at once.
//!
//! Operands are merged pairwise in a balanced tree, so each structural merge
//! sees operands of similar shape and the total work stays close to
//! `n log n` merges of equal-length instructions.

use super::merge::merge_channels;
use super::Instruction;
use crate::config::MergeConfig;
use crate::error::{Error, Result};

/// Name scalar instructions and merge them into one record instruction.
///
/// Field order follows the input order.
///
/// # Errors
///
/// - `InvalidValue` if `named` is empty
/// - `LengthMismatch` if the lengths differ
/// - `ElementTypeMismatch` if an operand is already a record or a name
///   repeats
pub fn merge_instructions<I, S>(named: I, config: &MergeConfig) -> Result<Instruction>
where
    I: IntoIterator<Item = (S, Instruction)>,
    S: AsRef<str>,
{
    let named = named
        .into_iter()
        .map(|(name, instruction)| instruction.with_name(name.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    if named.is_empty() {
        return Err(Error::InvalidValue("no instructions to merge".into()));
    }
    check_lengths(&named)?;
    merge_tree(&named, config)
}

/// Merge record instructions field-wise; field order follows the input.
///
/// # Errors
///
/// - `InvalidValue` if `instructions` is empty
/// - `LengthMismatch` if the lengths differ
/// - `ElementTypeMismatch` if an operand is not a record or names collide
pub fn stack_instructions(instructions: &[Instruction], config: &MergeConfig) -> Result<Instruction> {
    if instructions.is_empty() {
        return Err(Error::InvalidValue("no instructions to stack".into()));
    }
    if let Some(scalar) = instructions.iter().find(|i| !i.element_type().is_record()) {
        return Err(Error::ElementTypeMismatch(format!(
            "can only stack record instructions, got {}",
            scalar.element_type()
        )));
    }
    check_lengths(instructions)?;
    merge_tree(instructions, config)
}

fn check_lengths(instructions: &[Instruction]) -> Result<()> {
    let length = instructions[0].len();
    match instructions.iter().find(|i| i.len() != length) {
        Some(other) => Err(Error::LengthMismatch {
            left: length,
            right: other.len(),
        }),
        None => Ok(()),
    }
}

fn merge_tree(instructions: &[Instruction], config: &MergeConfig) -> Result<Instruction> {
    match instructions {
        [] => Err(Error::InvalidValue("no instructions to merge".into())),
        [single] => Ok(single.clone()),
        [a, b] => merge_channels(a, b, config),
        _ => {
            let (left, right) = instructions.split_at(instructions.len() / 2);
            let left = merge_tree(left, config)?;
            let right = merge_tree(right, config)?;
            merge_channels(&left, &right, config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::element::{Scalar, Value};
    use crate::instruction::leaf;

    #[test]
    fn test_merge_instructions_field_order() {
        let merged = merge_instructions(
            vec![
                ("ttl", leaf(vec![true, false]).unwrap()),
                ("dac", leaf(vec![0.5f32, 1.5]).unwrap()),
                ("trigger", leaf(vec![1u8, 0]).unwrap()),
            ],
            &MergeConfig::default(),
        )
        .unwrap();
        assert_eq!(merged.element_type().to_string(), "{ttl: bool, dac: f32, trigger: u8}");
        assert_eq!(
            merged.get(1).unwrap(),
            Value::Record(vec![
                ("ttl".into(), Scalar::Bool(false)),
                ("dac".into(), Scalar::F32(1.5)),
                ("trigger".into(), Scalar::U8(0)),
            ])
        );
    }

    #[test]
    fn test_merge_instructions_single() {
        let merged =
            merge_instructions(vec![("x", leaf(vec![1, 2]).unwrap())], &MergeConfig::default())
                .unwrap();
        assert_eq!(merged.get_field("x").unwrap(), leaf(vec![1, 2]).unwrap());
    }

    #[test]
    fn test_merge_instructions_empty() {
        let result = merge_instructions(Vec::<(String, Instruction)>::new(), &MergeConfig::default());
        assert!(matches!(result, Err(Error::InvalidValue(_))));
    }

    #[test]
    fn test_merge_instructions_length_mismatch() {
        let result = merge_instructions(
            vec![("a", leaf(vec![1]).unwrap()), ("b", leaf(vec![1, 2]).unwrap())],
            &MergeConfig::default(),
        );
        assert!(matches!(result, Err(Error::LengthMismatch { left: 1, right: 2 })));
    }

    #[test]
    fn test_stack_instructions_requires_records() {
        let result = stack_instructions(&[leaf(vec![1]).unwrap()], &MergeConfig::default());
        assert!(matches!(result, Err(Error::ElementTypeMismatch(_))));
    }

    #[test]
    fn test_stack_instructions_keeps_structure() {
        let config = MergeConfig::default();
        let a = (leaf(vec![1, 2]).unwrap() * 500).unwrap().with_name("a").unwrap();
        let b = (leaf(vec![3, 4]).unwrap() * 500).unwrap().with_name("b").unwrap();
        let c = (leaf(vec![true, false]).unwrap() * 500).unwrap().with_name("c").unwrap();
        let stacked = stack_instructions(&[a, b, c], &config).unwrap();
        let Instruction::Repetition(rep) = &stacked else {
            panic!("expected a repetition");
        };
        assert_eq!(rep.count(), 500);
        assert_eq!(stacked.width(), 3);
    }
}
