//! chained-hashmap: a separate-chaining hash map with insertion-ordered
//! entries, stable entry handles, and doubling growth.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the three concerns of a chained map in small, separately
//!   verifiable layers.
//! - Layers:
//!   - EntryStore<K, V>: owns every key/value pair in a slotmap arena
//!     threaded as an intrusive doubly linked list; new entries go to the
//!     front, so iteration order is most-recently-inserted first. Handles
//!     (`EntryRef`) are generational: stale handles resolve to `None`,
//!     never to a reused slot.
//!   - BucketTable: `capacity >= 1` buckets of non-owning handles, routed
//!     by `hash % capacity`. It is only ever rebuilt wholesale, never
//!     partially.
//!   - ChainedHashMap<K, V, S>: public API that enforces key uniqueness,
//!     owns the growth policy, and ties lookups to bucket scans.
//!
//! Constraints
//! - Single-threaded: all exclusivity rules are carried by `&`/`&mut`
//!   receivers; there is no internal synchronization or interior
//!   mutability.
//! - Keys are immutable post-insert; only values have mutable accessors.
//! - Each entry caches its `u64` hash at insertion, so `K: Hash` is never
//!   invoked during routing rebuilds and `Clone` needs no hash bound.
//! - Capacity is monotone: it doubles when `count >= capacity` and never
//!   shrinks, not even on `remove` or `clear`.
//!
//! Growth and failure safety
//! - Growth builds a complete replacement table from the store and swaps
//!   it in only when fully routed, so the entry/bucket invariant holds
//!   before and after every operation even across panics. The same refill
//!   primitive backs `Clone` and `clone_from`.
//!
//! Errors
//! - Exactly one recoverable error: `KeyNotFound` from `at`. `find`/`get`
//!   signal absence with `Option`; `insert` on a present key and `remove`
//!   on an absent key are silent no-ops.
//!
//! Notes and non-goals
//! - No thread safety, no persistence, no open addressing, no
//!   shrink-on-erase.
//! - The hasher is caller-supplied (`BuildHasher`, `RandomState` by
//!   default) and must stay fixed for the lifetime of a map instance.

mod bucket_table;
mod chained_hash_map;
mod chained_hash_map_proptest;
mod entry_store;

// Public surface
pub use chained_hash_map::{ChainedHashMap, IntoIter, Iter, IterMut, KeyNotFound, GROWTH_FACTOR};
pub use entry_store::EntryRef;
