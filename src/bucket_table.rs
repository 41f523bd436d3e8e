//! BucketTable: hash routing over non-owning entry handles.
//!
//! An array of `capacity >= 1` buckets; slot `hash % capacity` holds the
//! handles of all entries whose cached hash lands there. The table never
//! owns entries and never rebuilds itself partially: growth discards it and
//! the map layer refills a fresh one from the entry store.

use crate::entry_store::EntryRef;

#[derive(Debug)]
pub(crate) struct BucketTable {
    buckets: Vec<Vec<EntryRef>>,
}

impl BucketTable {
    /// Empty table with `max(1, capacity)` buckets.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, Vec::new);
        Self { buckets }
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn slot(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// The candidate handles for `hash`; equality on the key, not the hash,
    /// decides an actual match.
    pub fn bucket(&self, hash: u64) -> &[EntryRef] {
        &self.buckets[self.slot(hash)]
    }

    pub fn push(&mut self, hash: u64, r: EntryRef) {
        let slot = self.slot(hash);
        self.buckets[slot].push(r);
    }

    /// Unroute one handle. Buckets are unordered, so removal may swap.
    pub fn remove(&mut self, hash: u64, r: EntryRef) -> bool {
        let slot = self.slot(hash);
        let bucket = &mut self.buckets[slot];
        match bucket.iter().position(|&x| x == r) {
            Some(at) => {
                bucket.swap_remove(at);
                true
            }
            None => false,
        }
    }

    /// Empty every bucket; the bucket count (capacity) is retained.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }
}
