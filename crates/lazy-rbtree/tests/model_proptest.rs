//! Random operation sequences checked against a `BTreeMap` model.

use std::collections::BTreeMap;

use lazy_rbtree::{RbTree, TraverseOptions};
use proptest::prelude::*;

const KEY_SPACE: i32 = 200;
const PROPTEST_CASES: u32 = 256;

#[derive(Clone, Debug)]
enum Op {
    Insert(i32, u16),
    LazyDelete(i32),
    HardDelete(i32),
    Rebuild,
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0..KEY_SPACE, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
        4 => (0..KEY_SPACE).prop_map(Op::LazyDelete),
        4 => (0..KEY_SPACE).prop_map(Op::HardDelete),
        1 => Just(Op::Rebuild),
        1 => Just(Op::Clear),
    ]
}

/// Occupied keys mapped to their value, `None` for tombstones.
type Model = BTreeMap<i32, Option<u16>>;

fn apply(tree: &mut RbTree<i32, u16>, model: &mut Model, op: &Op) -> Result<(), TestCaseError> {
    match *op {
        Op::Insert(k, v) => {
            let fresh = !model.contains_key(&k);
            model.insert(k, Some(v));
            prop_assert_eq!(tree.insert(k, v), fresh);
        }
        Op::LazyDelete(k) => {
            let changed = matches!(model.get(&k), Some(Some(_)));
            if changed {
                model.insert(k, None);
            }
            prop_assert_eq!(tree.delete(&k, false), changed);
        }
        Op::HardDelete(k) => {
            let changed = model.remove(&k).is_some();
            prop_assert_eq!(tree.delete(&k, true), changed);
        }
        Op::Rebuild => {
            model.retain(|_, v| v.is_some());
            tree.rebuild();
        }
        Op::Clear => {
            model.clear();
            tree.clear();
        }
    }
    Ok(())
}

fn live(model: &Model) -> Vec<(i32, u16)> {
    model
        .iter()
        .filter_map(|(k, v)| v.map(|v| (*k, v)))
        .collect()
}

fn scan(tree: &RbTree<i32, u16>, options: TraverseOptions<i32>) -> Vec<(i32, u16)> {
    tree.entries(options).map(|(k, v)| (*k, *v)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn operations_match_model(ops in proptest::collection::vec(op(), 0..400)) {
        let mut tree = RbTree::new();
        let mut model = Model::new();

        for op in &ops {
            apply(&mut tree, &mut model, op)?;
            prop_assert_eq!(tree.validate(), Ok(()));
            prop_assert_eq!(tree.total_size(), model.len());
            prop_assert_eq!(tree.size(), model.values().filter(|v| v.is_some()).count());
        }

        prop_assert_eq!(scan(&tree, TraverseOptions::default()), live(&model));
        for k in 0..KEY_SPACE {
            let expected = model.get(&k).copied().flatten();
            prop_assert_eq!(tree.get(&k).copied(), expected);
            prop_assert_eq!(tree.has(&k), expected.is_some());
        }
    }

    #[test]
    fn reverse_scan_is_strictly_decreasing(ops in proptest::collection::vec(op(), 0..200)) {
        let mut tree = RbTree::new();
        let mut model = Model::new();
        for op in &ops {
            apply(&mut tree, &mut model, op)?;
        }
        let keys: Vec<i32> = tree
            .keys(TraverseOptions::new().reverse())
            .copied()
            .collect();
        prop_assert!(keys.windows(2).all(|w| w[0] > w[1]));

        let mut expected: Vec<i32> = live(&model).into_iter().map(|(k, _)| k).collect();
        expected.reverse();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn bounded_scan_matches_filter(
        ops in proptest::collection::vec(op(), 0..200),
        low in proptest::option::of(-10..KEY_SPACE + 10),
        high in proptest::option::of(-10..KEY_SPACE + 10),
        include_low in any::<bool>(),
        include_high in any::<bool>(),
        reverse in any::<bool>(),
    ) {
        let mut tree = RbTree::new();
        let mut model = Model::new();
        for op in &ops {
            apply(&mut tree, &mut model, op)?;
        }

        let options = TraverseOptions { reverse, low, high, include_low, include_high };
        let mut expected: Vec<(i32, u16)> = live(&model)
            .into_iter()
            .filter(|(k, _)| match low {
                None => true,
                Some(l) => if include_low { *k >= l } else { *k > l },
            })
            .filter(|(k, _)| match high {
                None => true,
                Some(h) => if include_high { *k <= h } else { *k < h },
            })
            .collect();
        if reverse {
            expected.reverse();
        }
        prop_assert_eq!(scan(&tree, options), expected);
    }

    #[test]
    fn rebuild_and_copy_preserve_live_content(ops in proptest::collection::vec(op(), 0..200)) {
        let mut tree = RbTree::new();
        let mut model = Model::new();
        for op in &ops {
            apply(&mut tree, &mut model, op)?;
        }
        let before = scan(&tree, TraverseOptions::default());

        let snapshot = tree.copy();
        let compacted = tree.rebuilt();
        tree.rebuild();

        prop_assert_eq!(tree.size(), tree.total_size());
        prop_assert_eq!(&scan(&tree, TraverseOptions::default()), &before);
        prop_assert_eq!(&scan(&compacted, TraverseOptions::default()), &before);
        prop_assert_eq!(&scan(&snapshot, TraverseOptions::default()), &before);
        prop_assert_eq!(snapshot.total_size(), model.len());
        prop_assert_eq!(tree.validate(), Ok(()));
        prop_assert_eq!(compacted.validate(), Ok(()));
        prop_assert_eq!(snapshot.validate(), Ok(()));
    }
}
