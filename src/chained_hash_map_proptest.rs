#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can check
// internals such as capacity monotonicity alongside the public contract.

use crate::chained_hash_map::{ChainedHashMap, KeyNotFound};
use proptest::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hasher;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Find(usize),
    At(usize),
    GetOrDefault(usize, i32),
    Contains(String),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            3 => idx.clone().prop_map(OpI::Find),
            2 => idx.clone().prop_map(OpI::At),
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::GetOrDefault(i, d)),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            2 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Shared body so the default-hasher and all-collisions variants exercise the
// exact same state machine.
fn run_state_machine<S>(mut sut: ChainedHashMap<Key, i32, S>, pool: Vec<String>, ops: Vec<OpI>)
where
    S: std::hash::BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    // Insertion order, oldest first; the map iterates it in reverse.
    let mut order: Vec<Key> = Vec::new();
    let mut last_capacity = sut.capacity();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(&pool, i);
                let already = model.contains_key(&k);
                match sut.insert(k.clone(), v) {
                    Some(r) => {
                        assert!(!already, "insert must no-op on duplicate");
                        assert_eq!(r.key(&sut), Some(&k));
                        assert_eq!(r.value(&sut), Some(&v));
                        model.insert(k.clone(), v);
                        order.push(k);
                    }
                    None => {
                        // First occurrence wins; the stored value is untouched.
                        assert!(already, "no-op only when the key exists");
                        assert_eq!(sut.get(&k), model.get(&k));
                    }
                }
            }
            OpI::Remove(i) => {
                let k = key_from(&pool, i);
                let removed = sut.remove(&k);
                assert_eq!(removed, model.remove(&k));
                if removed.is_some() {
                    order.retain(|ok| ok != &k);
                }
                // Second removal is always a silent no-op.
                assert_eq!(sut.remove(&k), None);
            }
            OpI::Find(i) => {
                let k = key_from(&pool, i);
                match sut.find(&k) {
                    Some(r) => {
                        assert!(model.contains_key(&k));
                        assert_eq!(r.key(&sut), Some(&k));
                        assert_eq!(r.value(&sut), model.get(&k));
                    }
                    None => assert!(!model.contains_key(&k)),
                }
            }
            OpI::At(i) => {
                let k = key_from(&pool, i);
                // Borrowed lookup via &str on both at and find.
                match sut.at(k.0.as_str()) {
                    Ok(v) => assert_eq!(Some(v), model.get(&k)),
                    Err(KeyNotFound) => {
                        assert!(sut.find(k.0.as_str()).is_none());
                        assert!(!model.contains_key(&k));
                    }
                }
            }
            OpI::GetOrDefault(i, d) => {
                let k = key_from(&pool, i);
                let inserted = !model.contains_key(&k);
                let v = sut.get_or_insert_default(k.clone());
                *v = v.saturating_add(d);
                let mv = model.entry(k.clone()).or_insert(0);
                *mv = mv.saturating_add(d);
                if inserted {
                    order.push(k);
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                assert_eq!(has, has_model);
            }
            OpI::Iterate => {
                let seen: Vec<Key> = sut.iter().map(|(k, _)| k.clone()).collect();
                assert_eq!(seen.len(), sut.len(), "iter must visit exactly len entries");
                let expected: Vec<Key> = order.iter().rev().cloned().collect();
                assert_eq!(seen, expected, "most-recently-inserted first");
                for (k, v) in sut.iter() {
                    assert_eq!(model.get(k), Some(v));
                }
            }
            OpI::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                order.clear();
                assert_eq!(sut.capacity(), cap, "clear must not shrink capacity");
                assert!(sut.is_empty());
            }
        }

        // Post-conditions after each op
        assert_eq!(sut.len(), model.len());
        assert_eq!(sut.is_empty(), model.is_empty());
        assert!(sut.capacity() >= 1);
        assert!(
            sut.capacity() >= last_capacity,
            "capacity must be monotone non-decreasing"
        );
        last_capacity = sut.capacity();
    }

    // Final sweep: every model key resolves, everything else misses.
    for (k, v) in &model {
        assert_eq!(sut.at(k.0.as_str()), Ok(v));
    }
    assert_eq!(sut.at("\u{1}not-in-pool"), Err(KeyNotFound));
}

// Property: state-machine equivalence against std::collections::HashMap,
// plus the contracts std cannot model: first-wins inserts, stable handles,
// most-recently-inserted-first iteration, and monotone capacity.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(ChainedHashMap::new(), pool, ops);
    }
}

// Collision variant using a constant hasher: every key routes to bucket 0,
// stressing in-bucket equality scans and rehashes that change nothing about
// the routing outcome.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl std::hash::BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(ChainedHashMap::with_hasher(ConstBuildHasher), pool, ops);
    }
}

// Property: construction paths agree on contents for any input sequence,
// first duplicate occurrence winning, while their capacity trajectories
// differ by design (incremental doubling vs one up-front pre-size).
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_construction_first_wins(pairs in proptest::collection::vec(("[a-z]{0,3}", any::<i32>()), 0..24)) {
        let mut expected: HashMap<String, i32> = HashMap::new();
        for (k, v) in &pairs {
            expected.entry(k.clone()).or_insert(*v);
        }

        let seq: ChainedHashMap<String, i32> = pairs.iter().cloned().collect();
        prop_assert_eq!(seq.len(), expected.len());
        for (k, v) in &expected {
            prop_assert_eq!(seq.at(k.as_str()), Ok(v));
        }

        let mut lit: ChainedHashMap<String, i32> = ChainedHashMap::with_capacity(pairs.len());
        let before = lit.capacity();
        prop_assert_eq!(before, (pairs.len() * 2).max(1));
        lit.extend(pairs.iter().cloned());
        // Pre-sizing means bulk load never rehashes.
        prop_assert_eq!(lit.capacity(), before);
        prop_assert_eq!(&lit, &seq);

        // Clone parity for good measure: deep copy with identical contents.
        let cloned = seq.clone();
        prop_assert_eq!(&cloned, &seq);
        prop_assert_eq!(cloned.capacity(), (seq.len() * 2).max(1));
    }
}
