// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Algebraic laws of instruction trees over randomly generated trees.

use proptest::prelude::*;
use proptest::sample::Index;
use qubit_os_sequencer::instruction::{
    concatenate, leaf, merge_channels, Instruction, ScalarType, Value,
};
use qubit_os_sequencer::MergeConfig;

fn arb_leaf() -> impl Strategy<Value = Instruction> {
    prop::collection::vec(-50i32..50, 1..6).prop_map(|values| leaf(values).unwrap())
}

/// Nested mixes of concatenations and repetitions over small leaves.
fn arb_instruction() -> impl Strategy<Value = Instruction> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..5)
                .prop_map(|parts| concatenate(parts).unwrap()),
            (inner, 2usize..6).prop_map(|(body, count)| body.repeat(count).unwrap()),
        ]
    })
}

/// Three instructions cut to a common length.
fn arb_aligned_triple() -> impl Strategy<Value = (Instruction, Instruction, Instruction)> {
    (arb_instruction(), arb_instruction(), arb_instruction()).prop_map(|(a, b, c)| {
        let len = a.len().min(b.len()).min(c.len());
        (
            a.slice(..len).unwrap(),
            b.slice(..len).unwrap(),
            c.slice(..len).unwrap(),
        )
    })
}

fn arb_config() -> impl Strategy<Value = MergeConfig> {
    prop_oneof![
        Just(MergeConfig::default()),
        (1usize..8, 2usize..4).prop_map(|(max_block_len, min_block_repetitions)| MergeConfig {
            max_block_len,
            min_block_repetitions,
        }),
    ]
}

fn values(instruction: &Instruction) -> Vec<i32> {
    instruction.flatten().columns()[0].to_vec::<i32>()
}

/// Canonical form: no nested sequences, no empty children, no adjacent
/// leaves, folded loops.
fn assert_normal(instruction: &Instruction) {
    match instruction {
        Instruction::Leaf(_) => {}
        Instruction::Sequence(seq) => {
            assert!(seq.children().len() >= 2);
            for pair in seq.children().windows(2) {
                assert!(!matches!(pair, [Instruction::Leaf(_), Instruction::Leaf(_)]));
            }
            for child in seq.children() {
                assert!(!child.is_empty());
                assert!(!matches!(child, Instruction::Sequence(_)));
                assert_normal(child);
            }
        }
        Instruction::Repetition(rep) => {
            assert!(rep.count() >= 2);
            assert!(!rep.inner().is_empty());
            assert!(!matches!(rep.inner(), Instruction::Repetition(_)));
            assert_normal(rep.inner());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_generated_trees_are_normal(a in arb_instruction()) {
        assert_normal(&a);
    }

    #[test]
    fn prop_get_agrees_with_flatten(a in arb_instruction(), index in any::<Index>()) {
        let flat = values(&a);
        let i = index.index(a.len());
        prop_assert_eq!(a.get(i as i64).unwrap(), Value::from(flat[i]));
        let back = i as i64 - a.len() as i64;
        prop_assert_eq!(a.get(back).unwrap(), Value::from(flat[i]));
    }

    #[test]
    fn prop_concat_flattens_to_joined_values(a in arb_instruction(), b in arb_instruction()) {
        let joined = (&a + &b).unwrap();
        assert_normal(&joined);
        let mut expected = values(&a);
        expected.extend(values(&b));
        prop_assert_eq!(values(&joined), expected);
    }

    #[test]
    fn prop_repeat_tiles_values(a in arb_instruction(), count in 0usize..5) {
        let repeated = a.repeat(count).unwrap();
        assert_normal(&repeated);
        prop_assert_eq!(repeated.len(), a.len() * count);
        let expected: Vec<i32> = (0..count).flat_map(|_| values(&a)).collect();
        prop_assert_eq!(values(&repeated), expected);
        prop_assert_eq!(a.repeat(1).unwrap(), a);
    }

    #[test]
    fn prop_nested_repetition_folds(a in arb_instruction(), n in 2usize..5, m in 2usize..5) {
        let nested = a.repeat(m).unwrap().repeat(n).unwrap();
        let direct = a.repeat(n * m).unwrap();
        prop_assert_eq!(&nested, &direct);
        prop_assert_eq!(nested.depth(), a.repeat(n).unwrap().depth());
    }

    #[test]
    fn prop_slice_commutes_with_flatten(
        a in arb_instruction(),
        x in any::<Index>(),
        y in any::<Index>(),
    ) {
        let (x, y) = (x.index(a.len() + 1), y.index(a.len() + 1));
        let (start, stop) = (x.min(y), x.max(y));
        let sliced = a.slice(start..stop).unwrap();
        assert_normal(&sliced);
        prop_assert_eq!(values(&sliced), values(&a)[start..stop].to_vec());
    }

    #[test]
    fn prop_merge_is_associative(
        (a, b, c) in arb_aligned_triple(),
        config in arb_config(),
    ) {
        let a = a.with_name("a").unwrap();
        let b = b.with_name("b").unwrap();
        let c = c.with_name("c").unwrap();
        let left = merge_channels(&merge_channels(&a, &b, &config).unwrap(), &c, &config).unwrap();
        let right = merge_channels(&a, &merge_channels(&b, &c, &config).unwrap(), &config).unwrap();
        assert_normal(&left);
        assert_normal(&right);
        prop_assert_eq!(left.flatten(), right.flatten());
    }

    #[test]
    fn prop_unnamed_merge_is_associative(
        (a, b, c) in arb_aligned_triple(),
        config in arb_config(),
    ) {
        let left = merge_channels(&merge_channels(&a, &b, &config).unwrap(), &c, &config).unwrap();
        let right = merge_channels(&a, &merge_channels(&b, &c, &config).unwrap(), &config).unwrap();
        prop_assert_eq!(left.element_type().to_string(), "{f0: i32, f1: i32, f2: i32}");
        prop_assert_eq!(left.element_type(), right.element_type());
        prop_assert_eq!(left.flatten(), right.flatten());
        prop_assert_eq!(values(&right.get_field("f2").unwrap()), values(&c));
    }

    #[test]
    fn prop_merge_is_commutative_up_to_field_order(
        (a, b, _) in arb_aligned_triple(),
        config in arb_config(),
    ) {
        let ab = merge_channels(&a.with_name("a").unwrap(), &b.with_name("b").unwrap(), &config).unwrap();
        let ba = merge_channels(&b.with_name("b").unwrap(), &a.with_name("a").unwrap(), &config).unwrap();
        prop_assert_eq!(ab.width(), 2);
        for (name, original) in [("a", &a), ("b", &b)] {
            prop_assert_eq!(values(&ab.get_field(name).unwrap()), values(original));
            prop_assert_eq!(values(&ba.get_field(name).unwrap()), values(original));
        }
    }

    #[test]
    fn prop_widening_cast_round_trips(a in arb_instruction()) {
        let wide = a.as_type(&ScalarType::I64.into()).unwrap();
        prop_assert_eq!(wide.depth(), a.depth());
        let back = wide.as_type(&ScalarType::I32.into()).unwrap();
        prop_assert_eq!(values(&back), values(&a));
    }
}
