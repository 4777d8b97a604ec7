#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can inspect
// bucket layout through crate-visible fields.

use crate::chain_hash_map::ChainHashMap;
use crate::error::MapError;
use crate::policy;
use crate::strategy::{DefaultEq, DefaultHash, KeyEq, KeyHash};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// Pool-indexed operations so that shrinking moves toward fewer, earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Add(usize, i32),
    Set(usize, i32),
    Get(usize),
    Remove(usize),
    RemoveWithoutShrink(usize),
    Mutate(usize, i32),
    StepAll(i32),
    Trim,
    CloneAndDiverge(usize, i32),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Add(i, v)),
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
            2 => idx.clone().prop_map(Op::Get),
            3 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::RemoveWithoutShrink),
            1 => (idx.clone(), -100i32..100).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => (-100i32..100).prop_map(Op::StepAll),
            1 => Just(Op::Trim),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::CloneAndDiverge(i, v)),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn contents<K, V, E, H>(m: &ChainHashMap<K, V, E, H>) -> BTreeMap<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Invariant: every live node is reachable from exactly one bucket.
fn reachable<K, V, E, H>(m: &ChainHashMap<K, V, E, H>) -> usize {
    let mut seen = BTreeSet::new();
    for head in &m.buckets {
        let mut cur = *head;
        while let Some(k) = cur {
            assert!(seen.insert(k), "node linked twice");
            cur = m.nodes[k].next;
        }
    }
    seen.len()
}

// Drives one scenario against a std HashMap model. Shared by the default
// strategies and the constant-hash collision variant below.
fn run_scenario<E, H>(
    mut sut: ChainHashMap<String, i32, E, H>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    E: KeyEq<String> + Clone,
    H: KeyHash<String> + Clone,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let min_size = sut.table_size();

    for op in ops {
        let mut shrink_checked = false;
        // Load bound only applies right after an insertion; `trim` may leave
        // the table fuller than the high watermark until the next one.
        let mut inserted = false;
        match op {
            Op::Add(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                match sut.add(k.clone(), v) {
                    Ok(h) => {
                        prop_assert!(!already, "add must fail on duplicate");
                        prop_assert_eq!(h.value(&sut), Some(&v));
                        model.insert(k, v);
                        inserted = true;
                    }
                    Err(e) => {
                        prop_assert_eq!(e, MapError::DuplicateKey);
                        prop_assert!(already, "duplicate error only when key exists");
                    }
                }
            }
            Op::Set(i, v) => {
                let k = pool[i].clone();
                let before = sut.len();
                let prev = sut.set(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
                if prev.is_some() {
                    prop_assert_eq!(sut.len(), before);
                } else {
                    inserted = true;
                }
            }
            Op::Get(i) => {
                let k = &pool[i];
                match model.get(k) {
                    Some(v) => {
                        prop_assert_eq!(sut.get(k), Ok(v));
                    }
                    None => {
                        prop_assert_eq!(sut.get(k), Err(MapError::KeyNotFound));
                    }
                }
            }
            Op::Remove(i) => {
                let k = &pool[i];
                match model.remove(k) {
                    Some(v) => {
                        prop_assert_eq!(sut.remove(k), Ok(v));
                        shrink_checked = true;
                    }
                    None => {
                        prop_assert_eq!(sut.remove(k), Err(MapError::KeyNotFound));
                    }
                }
                prop_assert!(sut.try_get(k).is_none());
            }
            Op::RemoveWithoutShrink(i) => {
                let k = &pool[i];
                let size = sut.table_size();
                let expected = model.remove(k).ok_or(MapError::KeyNotFound);
                prop_assert_eq!(sut.remove_without_shrink(k), expected);
                prop_assert_eq!(sut.table_size(), size);
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                if let Ok(v) = sut.get_mut(k) {
                    *v = v.saturating_add(d);
                    if let Some(mv) = model.get_mut(k) {
                        *mv = mv.saturating_add(d);
                    }
                }
            }
            Op::StepAll(d) => {
                let size = sut.table_size();
                sut.for_each_value_mut(|v| *v = v.wrapping_add(d));
                for mv in model.values_mut() {
                    *mv = mv.wrapping_add(d);
                }
                prop_assert_eq!(sut.table_size(), size);
            }
            Op::Trim => {
                sut.trim();
                prop_assert_eq!(sut.table_size(), policy::trim_target(model.len()).unwrap_or(0));
            }
            Op::CloneAndDiverge(i, v) => {
                let before = contents(&sut);
                let mut copy = sut.clone();
                prop_assert_eq!(copy.table_size(), sut.table_size());
                copy.set(pool[i].clone(), v);
                copy.for_each_value_mut(|x| *x = x.wrapping_add(1));
                prop_assert_eq!(contents(&sut), before);
            }
        }

        // Post-conditions after each op
        let expected: BTreeMap<String, i32> =
            model.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(contents(&sut), expected);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(reachable(&sut), model.len());
        prop_assert!(policy::is_prime(sut.table_size()));
        prop_assert!(sut.len() <= sut.table_size());
        if inserted {
            prop_assert!(!policy::exceeds_max_load(sut.len(), sut.table_size()));
        }
        if shrink_checked {
            prop_assert!(
                sut.table_size() <= min_size
                    || !policy::below_min_load(sut.len(), sut.table_size())
            );
        }
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// - `add` rejects duplicates and never changes an existing value.
// - `set` upserts; a second set on the same key leaves `len` alone.
// - `remove` returns the model's value; a removed key no longer resolves.
// - Traversal sees exactly the model's pairs, before and after any resize.
// - Table size stays prime, load stays within the watermarks.
// - Clones are independent of their source.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: ChainHashMap<String, i32> = ChainHashMap::with_strategies(DefaultEq, DefaultHash::default());
        run_scenario(sut, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_with_hint((pool, ops) in arb_scenario(), hint in 0usize..64) {
        let sut: ChainHashMap<String, i32> = ChainHashMap::with_capacity(hint);
        prop_assert_eq!(sut.table_size(), policy::initial_table_size(Some(hint)).unwrap_or(0));
        run_scenario(sut, &pool, ops)?;
    }
}

fn const_hash(_: &String) -> u64 {
    7
}

// Property: same invariants under worst-case collisions, where every key
// lands in one chain and removal exercises head, interior and tail splices.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainHashMap::with_strategies(DefaultEq, const_hash as fn(&String) -> u64);
        run_scenario(sut, &pool, ops)?;
    }
}
