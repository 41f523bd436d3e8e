// ChainedHashMap integration test suite (consolidated).
//
// Each test documents what behavior is being verified and which invariants
// are assumed or asserted. The core invariants exercised:
// - Uniqueness: insert on a present key is a silent no-op; first value wins.
// - Sizing: len tracks the number of distinct present keys; capacity only
//   ever doubles and never shrinks, not even on remove/clear.
// - Sentinels: find/get use Option, at uses KeyNotFound; never both.
// - Ordering: iteration is most-recently-inserted first, each live entry
//   exactly once.
// - Handles: EntryRef survives unrelated inserts and every rehash; it goes
//   stale only with its entry, and stale handles resolve to None.
// - Copying: Clone/clone_from deep-copy entries; the two sides share
//   nothing afterwards.

use chained_hashmap::{ChainedHashMap, KeyNotFound, GROWTH_FACTOR};
use std::collections::hash_map::RandomState;

// Test: scenario on a fresh map.
// Assumes: default construction uses capacity 1.
// Verifies: size 0, empty, find misses, at fails typed.
#[test]
fn fresh_map_misses_everything() {
    let m: ChainedHashMap<String, i32> = ChainedHashMap::new();
    assert_eq!(m.len(), 0);
    assert!(m.is_empty());
    assert!(m.find("x").is_none());
    assert_eq!(m.at("x"), Err(KeyNotFound));
    assert_eq!(m.capacity(), 1);
}

// Test: duplicate insert keeps the first value.
// Assumes: insert never overwrites.
// Verifies: size counts distinct keys; find yields the original value.
#[test]
fn insert_keeps_first_value() {
    let mut m: ChainedHashMap<&'static str, i32> = ChainedHashMap::new();
    m.insert("a", 1);
    m.insert("b", 2);
    m.insert("a", 3);
    assert_eq!(m.len(), 2);
    let r = m.find(&"a").expect("present");
    assert_eq!(r.value(&m), Some(&1));
}

// Test: index-style access on a fresh map.
// Assumes: get_or_insert_default inserts V::default() when absent.
// Verifies: assigning through the returned reference is visible to at().
#[test]
fn index_then_assign() {
    let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
    *m.get_or_insert_default("c".to_string()) = 5;
    assert_eq!(m.len(), 1);
    assert_eq!(m.at("c"), Ok(&5));
}

// Test: removal semantics.
// Assumes: remove on an absent key is a silent no-op.
// Verifies: size drops once, find misses, second remove changes nothing.
#[test]
fn remove_then_remove_again() {
    let mut m: ChainedHashMap<&'static str, i32> = ChainedHashMap::new();
    m.insert("a", 1);
    assert_eq!(m.remove(&"a"), Some(1));
    assert_eq!(m.len(), 0);
    assert!(m.find(&"a").is_none());
    assert_eq!(m.remove(&"a"), None);
    assert_eq!(m.len(), 0);
}

// Test: literal construction with duplicate keys.
// Assumes: first occurrence in traversal order wins; capacity pre-sized to
// max(1, input * 2) once, up front.
// Verifies: size equals distinct keys; first value retained.
#[test]
fn literal_with_duplicates() {
    let m = ChainedHashMap::from([("x", 1), ("x", 2), ("y", 3)]);
    assert_eq!(m.len(), 2);
    assert_eq!(m.at(&"x"), Ok(&1));
    assert_eq!(m.capacity(), 6);
}

// Test: 1000 distinct keys through the incremental growth path.
// Assumes: growth doubles at count >= capacity and never shrinks.
// Verifies: all keys findable, no duplicates, capacity is the next power of
// two above the count.
#[test]
fn thousand_keys_grow_by_doubling() {
    let mut m: ChainedHashMap<u32, u32> = ChainedHashMap::new();
    let mut last_cap = m.capacity();
    for i in 0..1000 {
        m.insert(i, i * 3);
        assert!(m.capacity() >= last_cap);
        last_cap = m.capacity();
    }
    assert_eq!(m.len(), 1000);
    assert_eq!(m.capacity(), 1024);
    for i in 0..1000 {
        assert_eq!(m.at(&i), Ok(&(i * 3)));
    }
    let mut keys: Vec<u32> = m.keys().copied().collect();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), 1000);
}

// Test: iteration contract.
// Assumes: entries are prepended, so iteration is reverse insertion order.
// Verifies: exactly len entries, distinct keys, order as specified, and the
// owned iterator drains in the same order.
#[test]
fn iteration_order_and_counts() {
    let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
    for (i, k) in ["first", "second", "third"].iter().enumerate() {
        m.insert((*k).to_string(), i as i32);
    }
    let keys: Vec<_> = m.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(keys, ["third", "second", "first"]);
    assert_eq!(m.iter().count(), m.len());

    let drained: Vec<_> = m.into_iter().map(|(k, _)| k).collect();
    assert_eq!(drained, ["third", "second", "first"]);
}

// Test: handle validity across unrelated mutation.
// Assumes: rehash rebuilds routing without touching entries.
// Verifies: a handle taken before many inserts still resolves, mutation
// through it is observed, and removal makes it stale.
#[test]
fn handle_survives_growth_and_unrelated_removals() {
    let mut m: ChainedHashMap<u32, String> = ChainedHashMap::new();
    let r = m.insert(42, "v".to_string()).expect("fresh key");
    for i in 0..64 {
        m.insert(i, i.to_string());
    }
    for i in 0..32 {
        m.remove(&i);
    }
    assert_eq!(r.key(&m), Some(&42));
    r.value_mut(&mut m).expect("live").push('!');
    assert_eq!(m.at(&42), Ok(&"v!".to_string()));

    m.remove(&42);
    assert_eq!(r.value(&m), None);
}

// Test: clear drops contents, keeps the table.
// Assumes: clear never shrinks capacity.
// Verifies: previous keys miss; handles are stale; the map stays usable.
#[test]
fn clear_then_reuse() {
    let mut m: ChainedHashMap<u32, u32> = ChainedHashMap::new();
    let r = m.insert(1, 10).expect("fresh key");
    for i in 2..20 {
        m.insert(i, i);
    }
    let cap = m.capacity();
    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.capacity(), cap);
    assert!(m.find(&1).is_none());
    assert_eq!(r.value(&m), None);

    m.insert(1, 11);
    assert_eq!(m.at(&1), Ok(&11));
}

// Test: copy semantics.
// Assumes: Clone deep-copies entries and re-routes with a 2x table.
// Verifies: identical contents, fully independent storage afterwards.
#[test]
fn clone_shares_nothing() {
    let mut a: ChainedHashMap<String, Vec<i32>> = ChainedHashMap::new();
    a.insert("k".to_string(), vec![1, 2]);
    let mut b = a.clone();
    assert_eq!(a, b);

    b.get_mut("k").expect("present").push(3);
    assert_eq!(a.at("k"), Ok(&vec![1, 2]));
    assert_eq!(b.at("k"), Ok(&vec![1, 2, 3]));

    a.remove("k");
    assert!(b.contains_key("k"));
}

// Test: assignment semantics via clone_from.
// Assumes: destination capacity grows to at least source len * 2 and never
// shrinks; contents are replaced wholesale.
// Verifies: old destination keys miss, source is unaffected by later
// destination mutation.
#[test]
fn clone_from_replaces_contents() {
    let mut dst: ChainedHashMap<u32, u32> = ChainedHashMap::new();
    for i in 0..50 {
        dst.insert(i, i);
    }
    let dst_cap = dst.capacity();

    let mut src: ChainedHashMap<u32, u32> = ChainedHashMap::new();
    src.insert(100, 1);
    src.insert(101, 2);

    dst.clone_from(&src);
    assert_eq!(dst.len(), 2);
    assert_eq!(dst, src);
    assert_eq!(dst.capacity(), dst_cap, "larger capacity must be kept");
    assert!(dst.find(&0).is_none());

    *dst.get_mut(&100).expect("present") = 77;
    assert_eq!(src.at(&100), Ok(&1));

    // The other direction: a small destination grows.
    let mut small: ChainedHashMap<u32, u32> = ChainedHashMap::new();
    small.clone_from(&dst);
    assert!(small.capacity() >= dst.len() * GROWTH_FACTOR);
    assert_eq!(small, dst);
}

// Test: KeyNotFound is a first-class error type.
// Assumes: at() is the only fallible operation.
// Verifies: Display message and std::error::Error impl.
#[test]
fn key_not_found_is_a_real_error() {
    let m: ChainedHashMap<String, i32> = ChainedHashMap::new();
    let err = m.at("nope").expect_err("must miss");
    assert_eq!(err.to_string(), "key not found");
    let _: &dyn std::error::Error = &err;
}

// Test: the hasher is caller-supplied and observable.
// Assumes: the hasher stays fixed for the map's lifetime; clones carry it.
// Verifies: hasher() returns the instance the map was built with.
#[test]
fn hasher_accessor() {
    let state = RandomState::new();
    let mut m: ChainedHashMap<String, i32, RandomState> =
        ChainedHashMap::with_hasher(state.clone());
    let _ = m.hasher();
    m.insert("a".to_string(), 1);

    // A clone keeps routing consistent with its copied hasher.
    let c = m.clone();
    assert_eq!(c.at("a"), Ok(&1));
}

// Test: size tracks distinct present keys across a mixed workload.
// Assumes: insert/remove/get_or_insert_default are the only size changers.
// Verifies: len equals a straightforward running count.
#[test]
fn len_tracks_distinct_present_keys() {
    let mut m: ChainedHashMap<u32, u32> = ChainedHashMap::new();
    let mut expected = 0usize;
    for i in 0..20 {
        if m.insert(i % 7, i).is_some() {
            expected += 1;
        }
        assert_eq!(m.len(), expected);
    }
    assert_eq!(m.len(), 7);
    for i in 0..5 {
        if m.remove(&i).is_some() {
            expected -= 1;
        }
        assert_eq!(m.len(), expected);
    }
    m.get_or_insert_default(3);
    assert_eq!(m.len(), expected + 1);
}
