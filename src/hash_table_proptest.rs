#![cfg(test)]

// Property tests for RobinHoodTable kept inside the crate so they can check
// the bucket layout after every operation.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use proptest::prelude::*;

use crate::hash_table::Entry;
use crate::hash_table::RobinHoodTable;

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, i32),
    Upsert(u16, i32),
    Remove(u16),
    Find(u16),
    Retain(u16),
    Reserve(u8),
    Clear,
}

// Hashes are squeezed into a narrow range so that probe chains collide,
// overlap and wrap around the end of the bucket array.
fn hash_of(key: u16, spread: u64) -> u64 {
    (key as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) % spread
}

fn arb_ops() -> impl Strategy<Value = (u64, Vec<Op>)> {
    let key = 0u16..200;
    let op = prop_oneof![
        4 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Upsert(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.clone().prop_map(Op::Find),
        1 => (1u16..6).prop_map(Op::Retain),
        1 => any::<u8>().prop_map(Op::Reserve),
        1 => Just(Op::Clear),
    ];
    (1u64..64, proptest::collection::vec(op, 1..300))
}

fn run_against_model<I: crate::BucketIndex>(
    table: &mut RobinHoodTable<(u16, i32), I>,
    spread: u64,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<u16, i32> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let hash = hash_of(k, spread);
                let old = table.insert(hash, (k, v), |e| e.0 == k);
                prop_assert_eq!(old.map(|e| e.1), model.insert(k, v));
            }
            Op::Upsert(k, v) => {
                let hash = hash_of(k, spread);
                let capacity = table.capacity();
                let existed = model.contains_key(&k);
                match table.entry(hash, |e| e.0 == k) {
                    Entry::Occupied(mut entry) => {
                        prop_assert!(existed);
                        entry.get_mut().1 = v;
                    }
                    Entry::Vacant(entry) => {
                        prop_assert!(!existed);
                        entry.insert((k, v));
                    }
                }
                if existed {
                    prop_assert_eq!(table.capacity(), capacity, "update must not grow");
                }
                model.insert(k, v);
            }
            Op::Remove(k) => {
                let hash = hash_of(k, spread);
                let removed = table.remove(hash, |e| e.0 == k);
                prop_assert_eq!(removed.map(|e| e.1), model.remove(&k));
            }
            Op::Find(k) => {
                let hash = hash_of(k, spread);
                let found = table.find(hash, |e| e.0 == k).map(|e| e.1);
                prop_assert_eq!(found, model.get(&k).copied());
            }
            Op::Retain(m) => {
                let mut calls = 0;
                table.retain(|e| {
                    calls += 1;
                    e.0 % m != 0
                });
                prop_assert_eq!(calls, model.len(), "retain must visit each value once");
                model.retain(|k, _| k % m != 0);
            }
            Op::Reserve(n) => {
                if table.try_reserve(n as usize).is_ok() {
                    prop_assert!(table.len() + n as usize <= table.capacity());
                }
            }
            Op::Clear => {
                table.clear();
                model.clear();
            }
        }

        table.assert_invariants();
        prop_assert_eq!(table.len(), model.len());
        prop_assert!(table.len() <= table.max_load() || table.capacity() == I::MAX_CAPACITY);
    }

    let mut contents: Vec<(u16, i32)> = table.iter().copied().collect();
    contents.sort_unstable();
    let expected: Vec<(u16, i32)> = model.into_iter().collect();
    prop_assert_eq!(contents, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_layout_matches_model((spread, ops) in arb_ops()) {
        let mut table: RobinHoodTable<(u16, i32)> = RobinHoodTable::new();
        run_against_model(&mut table, spread, ops)?;
    }

    // A u8 index stops growth at 255 buckets, so the table runs past its
    // usual load factor.
    #[test]
    fn prop_saturated_u8_table_matches_model((spread, ops) in arb_ops()) {
        let mut table: RobinHoodTable<(u16, i32), u8> = RobinHoodTable::new();
        let ops = ops
            .into_iter()
            .filter(|op| !matches!(op, Op::Reserve(_)))
            .collect::<Vec<_>>();
        run_against_model(&mut table, spread, ops)?;
    }
}
