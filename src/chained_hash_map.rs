//! ChainedHashMap: the public API layer tying entry storage to bucket routing.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;
use thiserror::Error;

use crate::bucket_table::BucketTable;
use crate::entry_store::{self, EntryRef, EntryStore};

/// Bucket count multiplier applied on every growth step.
pub const GROWTH_FACTOR: usize = 2;

/// Error returned by [`ChainedHashMap::at`] when the key is absent. The only
/// recoverable error in this crate; every other operation signals absence
/// through `Option` or is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key not found")]
pub struct KeyNotFound;

/// A separate-chaining hash map with doubling growth.
///
/// Entries are kept in insertion order (most recent first) in an owned entry
/// store; a bucket table of `capacity >= 1` slots routes keys to candidate
/// entries via `hash % capacity`. Whenever an insertion brings the entry
/// count up to the capacity, the capacity doubles and routing is rebuilt
/// from scratch; entries themselves are never moved, so [`EntryRef`] handles
/// survive every rehash. Capacity never shrinks, not even on
/// [`remove`](Self::remove) or [`clear`](Self::clear).
///
/// The hasher must be a deterministic, pure function of the key for the
/// lifetime of the map; each entry's hash is computed once at insertion and
/// cached, so `K: Hash` is never invoked again afterwards.
pub struct ChainedHashMap<K, V, S = RandomState> {
    hasher: S,
    store: EntryStore<K, V>,
    table: BucketTable,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Empty map with capacity 1 and the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Empty map pre-sized so `capacity` insertions cannot trigger a rehash.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S> Default for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            store: EntryStore::new(),
            table: BucketTable::with_capacity(1),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            store: EntryStore::new(),
            table: BucketTable::with_capacity(capacity.saturating_mul(GROWTH_FACTOR)),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Current bucket count. Monotonically non-decreasing over the life of
    /// the map.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Look a key up; `None` is the "not found" sentinel. Never mutates.
    pub fn find<Q>(&self, key: &Q) -> Option<EntryRef>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.find_hashed(hash, key)
    }

    // Scan the one candidate bucket. Collisions are expected; equality on
    // the key, never the hash, decides the match.
    fn find_hashed<Q>(&self, hash: u64, key: &Q) -> Option<EntryRef>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.bucket(hash).iter().copied().find(|&r| {
            self.store
                .key(r)
                .map(|k| k.borrow() == key)
                .unwrap_or(false)
        })
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let r = self.find(key)?;
        self.store.value(r)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let r = self.find(key)?;
        self.store.value_mut(r)
    }

    /// Read-only access that fails with [`KeyNotFound`] when the key is
    /// absent; succeeds exactly when [`find`](Self::find) would.
    pub fn at<Q>(&self, key: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).ok_or(KeyNotFound)
    }

    /// Insert a new entry; a silent no-op returning `None` when the key is
    /// already present (the existing value stays untouched).
    pub fn insert(&mut self, key: K, value: V) -> Option<EntryRef> {
        let hash = self.make_hash(&key);
        if self.find_hashed(hash, &key).is_some() {
            return None;
        }
        Some(self.add(key, value, hash))
    }

    /// The index operator: a mutable reference to the value for `key`,
    /// inserting a default-constructed value first when the key is absent.
    /// Never overwrites an existing value.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let hash = self.make_hash(&key);
        let r = match self.find_hashed(hash, &key) {
            Some(r) => r,
            None => self.add(key, V::default(), hash),
        };
        self.store
            .value_mut(r)
            .expect("entry must be live immediately after lookup or insert")
    }

    /// Remove the entry for `key`, returning its value. A silent no-op
    /// returning `None` when absent. Capacity is never reduced.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let r = self.find_hashed(hash, key)?;
        let unrouted = self.table.remove(hash, r);
        debug_assert!(unrouted, "found entry must be routed in its bucket");
        let (_key, value, _hash) = self
            .store
            .remove(r)
            .expect("found entry must be live in the store");
        Some(value)
    }

    /// Drop every entry; all outstanding handles become stale. The bucket
    /// count is retained.
    pub fn clear(&mut self) {
        self.store.clear();
        self.table.clear();
    }

    // Prepend the entry, then apply the growth policy: at `count >=
    // capacity` the table doubles and routing is rebuilt wholesale.
    fn add(&mut self, key: K, value: V, hash: u64) -> EntryRef {
        let r = self.store.push_front(key, value, hash);
        if self.store.len() >= self.table.capacity() {
            let capacity = self.table.capacity() * GROWTH_FACTOR;
            self.table = refill(&self.store, capacity);
        } else {
            self.table.push(hash, r);
        }
        r
    }
}

// Build a fully routed table for `store` at `capacity`. Shared by growth,
// `Clone` and `clone_from`; callers swap it in only once complete, so a
// panic mid-build leaves the previous routing intact.
fn refill<K, V>(store: &EntryStore<K, V>, capacity: usize) -> BucketTable {
    let mut table = BucketTable::with_capacity(capacity);
    for (r, hash) in store.routes() {
        table.push(hash, r);
    }
    table
}

impl EntryRef {
    /// Borrow the key of the entry this handle points at; `None` once the
    /// entry has been removed. Keys are immutable post-insertion: there is
    /// deliberately no `key_mut`.
    pub fn key<'a, K, V, S>(&self, map: &'a ChainedHashMap<K, V, S>) -> Option<&'a K> {
        map.store.key(*self)
    }

    /// Borrow the entry's value.
    pub fn value<'a, K, V, S>(&self, map: &'a ChainedHashMap<K, V, S>) -> Option<&'a V> {
        map.store.value(*self)
    }

    /// Mutably borrow the entry's value.
    pub fn value_mut<'a, K, V, S>(
        &self,
        map: &'a mut ChainedHashMap<K, V, S>,
    ) -> Option<&'a mut V> {
        map.store.value_mut(*self)
    }
}

impl<K, V, S> Clone for ChainedHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Deep copy: entries are cloned preserving order, the new table is
    /// sized at `max(1, len * GROWTH_FACTOR)` and refilled. The copy shares
    /// nothing with the source. Cached hashes make this possible without a
    /// `K: Hash` bound.
    fn clone(&self) -> Self {
        let store = self.store.clone();
        let table = refill(&store, store.len().saturating_mul(GROWTH_FACTOR));
        Self {
            hasher: self.hasher.clone(),
            store,
            table,
        }
    }

    /// Assignment: replaces this map's entries with deep copies of the
    /// source's and adopts the source's hasher (cached hashes stay
    /// consistent). Capacity grows to at least `source.len() *
    /// GROWTH_FACTOR` but never shrinks. Self-assignment cannot be expressed
    /// here: `&mut self` and `&Self` may not alias.
    fn clone_from(&mut self, source: &Self) {
        let capacity = self
            .table
            .capacity()
            .max(source.store.len().saturating_mul(GROWTH_FACTOR));
        // Finish every fallible clone before touching any field, so a panic
        // mid-copy leaves this map exactly as it was.
        let store = source.store.clone();
        let table = refill(&store, capacity);
        self.hasher = source.hasher.clone();
        self.store = store;
        self.table = table;
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Per-pair [`insert`](Self::insert): the first occurrence of a key
    /// wins, later duplicates are silently skipped, and growth applies
    /// incrementally.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            let _ = self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    /// The sequence constructor: starts at capacity 1 and grows
    /// incrementally as pairs are inserted.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// The literal constructor: capacity is pre-sized once to `max(1, N *
    /// GROWTH_FACTOR)` before any insertion, so bulk load never rehashes.
    /// Duplicate keys follow the same first-wins rule as `FromIterator`.
    fn from(pairs: [(K, V); N]) -> Self {
        let mut map = Self::with_capacity(N);
        map.extend(pairs);
        map
    }
}

impl<K, V, S> PartialEq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    /// Contents equality, insensitive to insertion order and capacity.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

impl<K, V, S> Eq for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    /// Iterate entries most-recently-inserted first. Double-ended and exact
    /// size; visits each live entry exactly once.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.store.iter(),
        }
    }

    /// Like [`iter`](Self::iter) with mutable access to values. Keys stay
    /// shared: they are immutable post-insertion.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.store.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.iter_mut().map(|(_, v)| v)
    }
}

/// Immutable entry iterator, most-recently-inserted first.
pub struct Iter<'a, K, V> {
    inner: entry_store::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> core::iter::FusedIterator for Iter<'_, K, V> {}

/// Mutable entry iterator, most-recently-inserted first.
pub struct IterMut<'a, K, V> {
    inner: entry_store::IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> core::iter::FusedIterator for IterMut<'_, K, V> {}

/// Owned entry iterator: drains the map most-recently-inserted first.
pub struct IntoIter<K, V> {
    store: EntryStore<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.store.pop_front().map(|(k, v, _)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.store.len(), Some(self.store.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.store.pop_back().map(|(k, v, _)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.store.len()
    }
}

impl<K, V> core::iter::FusedIterator for IntoIter<K, V> {}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ChainedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { store: self.store }
    }
}
