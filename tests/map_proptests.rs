// Model-based property tests for HashMap against std's BTreeMap.
//
// Invariants exercised across random operation sequences:
// - Most recent value wins; overwrites keep `len` unchanged.
// - `len` equals the number of distinct live keys.
// - Removing twice is a no-op the second time.
// - Iteration yields every live entry exactly once.
// - Growth and backward-shift removal never lose entries, including when all
//   keys collide into a handful of probe chains.
use std::collections::BTreeMap;
use std::hash::BuildHasherDefault;
use std::hash::Hasher;

use proptest::prelude::*;
use robin_hash::DefaultHashBuilder;
use robin_hash::HashMap;

// Maps every key onto a few hash values so probe chains grow long.
#[derive(Default)]
struct CoarseHasher(u64);

impl Hasher for CoarseHasher {
    fn finish(&self) -> u64 {
        self.0 % 5
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(b as u64);
        }
    }
}

type Coarse = BuildHasherDefault<CoarseHasher>;

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    TryInsert(u16, u32),
    EntryAdd(u16, u32),
    Remove(u16),
    Get(u16),
    RetainEven,
    Clear,
    Reset,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let key = 0u16..512;
    let op = prop_oneof![
        6 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        1 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::TryInsert(k, v)),
        2 => (key.clone(), 0u32..100).prop_map(|(k, v)| Op::EntryAdd(k, v)),
        4 => key.clone().prop_map(Op::Remove),
        3 => key.prop_map(Op::Get),
        1 => Just(Op::RetainEven),
        1 => Just(Op::Clear),
        1 => Just(Op::Reset),
    ];
    proptest::collection::vec(op, 1..400)
}

fn check<S, I>(mut map: HashMap<u16, u32, S, I>, ops: Vec<Op>) -> Result<(), TestCaseError>
where
    S: std::hash::BuildHasher,
    I: robin_hash::BucketIndex,
{
    let mut model: BTreeMap<u16, u32> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let len_before = map.len();
                let existed = model.contains_key(&k);
                prop_assert_eq!(map.insert(k, v), model.insert(k, v));
                if existed {
                    prop_assert_eq!(map.len(), len_before);
                }
            }
            Op::TryInsert(k, v) => {
                let result = map.try_insert(k, v);
                prop_assert_eq!(result, Ok(model.insert(k, v)));
            }
            Op::EntryAdd(k, v) => {
                let slot = map.entry(k).or_insert(0);
                *slot = slot.wrapping_add(v);
                let expected = model.entry(k).or_insert(0);
                *expected = expected.wrapping_add(v);
            }
            Op::Remove(k) => {
                let expected = model.remove(&k);
                prop_assert_eq!(map.remove(&k), expected);
                prop_assert_eq!(map.remove(&k), None);
            }
            Op::Get(k) => {
                prop_assert_eq!(map.get(&k), model.get(&k));
                prop_assert_eq!(map.contains_key(&k), model.contains_key(&k));
            }
            Op::RetainEven => {
                map.retain(|k, _| k % 2 == 0);
                model.retain(|k, _| k % 2 == 0);
            }
            Op::Clear => {
                map.clear();
                model.clear();
            }
            Op::Reset => {
                map.reset();
                model.clear();
                prop_assert_eq!(map.capacity(), 0);
            }
        }

        prop_assert_eq!(map.len(), model.len());
    }

    let mut seen: Vec<(u16, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
    seen.sort_unstable();
    let expected: Vec<(u16, u32)> = model.into_iter().collect();
    prop_assert_eq!(seen, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_map_matches_btreemap(ops in arb_ops()) {
        check(HashMap::<u16, u32>::new(), ops)?;
    }

    #[test]
    fn prop_map_with_colliding_hashes(ops in arb_ops()) {
        check(HashMap::<u16, u32, Coarse>::default(), ops)?;
    }

    #[test]
    fn prop_u16_indexed_map_matches_btreemap(ops in arb_ops()) {
        check(HashMap::<u16, u32, DefaultHashBuilder, u16>::default(), ops)?;
    }
}
