//! EntryStore: owned entry storage with stable handles and list order.
//!
//! Entries live in a `SlotMap` arena and are threaded together with
//! intrusive `prev`/`next` links, so the store behaves like a doubly linked
//! list (new entries at the front) while handles stay identity-stable:
//! generational slotmap keys guarantee that a handle for a removed entry
//! never resolves to a later entry reusing the same slot.
//!
//! The store knows nothing about hashing or duplicates; it caches each
//! entry's `u64` hash on behalf of the routing layer so `K: Hash` is never
//! invoked again after insertion.

use core::marker::PhantomData;
use core::ptr::NonNull;
use slotmap::{DefaultKey, SlotMap};
use std::collections::HashMap;

/// Stable handle to one entry. Copyable; resolving a stale handle yields
/// `None` rather than aliasing a newer entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntryRef(DefaultKey);

impl EntryRef {
    pub(crate) fn new(k: DefaultKey) -> Self {
        EntryRef(k)
    }
    pub(crate) fn raw(&self) -> DefaultKey {
        self.0
    }
}

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Debug)]
pub(crate) struct EntryStore<K, V> {
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V> EntryStore<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Prepend a new entry. The caller (the API layer) has already ruled out
    /// a duplicate key.
    pub fn push_front(&mut self, key: K, value: V, hash: u64) -> EntryRef {
        let old_head = self.head;
        let k = self.nodes.insert(Node {
            key,
            value,
            hash,
            prev: None,
            next: old_head,
        });
        match old_head {
            Some(h) => {
                self.nodes
                    .get_mut(h)
                    .expect("head link must point at a live node")
                    .prev = Some(k);
            }
            None => self.tail = Some(k),
        }
        self.head = Some(k);
        EntryRef::new(k)
    }

    /// Detach and destroy one entry. Only this handle is invalidated; all
    /// other handles keep resolving.
    pub fn remove(&mut self, r: EntryRef) -> Option<(K, V, u64)> {
        let node = self.nodes.remove(r.raw())?;
        match node.prev {
            Some(p) => {
                self.nodes
                    .get_mut(p)
                    .expect("prev link must point at a live node")
                    .next = node.next;
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => {
                self.nodes
                    .get_mut(n)
                    .expect("next link must point at a live node")
                    .prev = node.prev;
            }
            None => self.tail = node.prev,
        }
        Some((node.key, node.value, node.hash))
    }

    pub fn pop_front(&mut self) -> Option<(K, V, u64)> {
        let k = self.head?;
        self.remove(EntryRef::new(k))
    }

    pub fn pop_back(&mut self) -> Option<(K, V, u64)> {
        let k = self.tail?;
        self.remove(EntryRef::new(k))
    }

    /// Destroy all entries; every outstanding handle becomes stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn key(&self, r: EntryRef) -> Option<&K> {
        self.nodes.get(r.raw()).map(|n| &n.key)
    }

    pub fn value(&self, r: EntryRef) -> Option<&V> {
        self.nodes.get(r.raw()).map(|n| &n.value)
    }

    pub fn value_mut(&mut self, r: EntryRef) -> Option<&mut V> {
        self.nodes.get_mut(r.raw()).map(|n| &mut n.value)
    }

    /// Walk handles and cached hashes in list order; this is what the
    /// routing layer consumes when it rebuilds a bucket table.
    pub fn routes(&self) -> impl Iterator<Item = (EntryRef, u64)> + '_ {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            let k = cursor?;
            let node = self.nodes.get(k)?;
            cursor = node.next;
            Some((EntryRef::new(k), node.hash))
        })
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            store: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        // One pass of disjoint `&mut Node` borrows; everything yielded later
        // goes through the pointers minted here, never through the arena
        // again, so items stay valid while later ones are pulled.
        let mut by_key: HashMap<DefaultKey, NonNull<Node<K, V>>> = self
            .nodes
            .iter_mut()
            .map(|(k, node)| (k, NonNull::from(node)))
            .collect();
        let mut order = Vec::with_capacity(by_key.len());
        let mut cursor = self.head;
        while let Some(k) = cursor {
            let ptr = by_key
                .remove(&k)
                .expect("list links must reference live nodes exactly once");
            // SAFETY: ptr came from a live node and only this loop reads it.
            cursor = unsafe { ptr.as_ref() }.next;
            order.push((k, ptr));
        }
        IterMut {
            order: order.into_iter(),
            _marker: PhantomData,
        }
    }
}

impl<K: Clone, V: Clone> Clone for EntryStore<K, V> {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        // Walk back-to-front so repeated push_front reproduces the order.
        let mut cursor = self.tail;
        while let Some(k) = cursor {
            let node = self
                .nodes
                .get(k)
                .expect("tail/prev links must point at live nodes");
            out.push_front(node.key.clone(), node.value.clone(), node.hash);
            cursor = node.prev;
        }
        out
    }
}

/// Bidirectional iterator over entries in list order (front first, i.e.
/// most-recently-inserted first).
pub(crate) struct Iter<'a, K, V> {
    store: &'a EntryStore<K, V>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (EntryRef, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let k = self.front?;
        let node = self.store.nodes.get(k)?;
        self.front = node.next;
        self.remaining -= 1;
        Some((EntryRef::new(k), &node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let k = self.back?;
        let node = self.store.nodes.get(k)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some((EntryRef::new(k), &node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> core::iter::FusedIterator for Iter<'_, K, V> {}

/// Mutable counterpart of [`Iter`]: shared key, mutable value.
///
/// Every node pointer is minted up front from a single exclusive pass over
/// the arena (see [`EntryStore::iter_mut`]); after construction the arena is
/// never touched again, so items already handed out stay valid while the
/// iterator advances.
pub(crate) struct IterMut<'a, K, V> {
    order: std::vec::IntoIter<(DefaultKey, NonNull<Node<K, V>>)>,
    _marker: PhantomData<&'a mut EntryStore<K, V>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    fn resolve((k, ptr): (DefaultKey, NonNull<Node<K, V>>)) -> (EntryRef, &'a K, &'a mut V) {
        // SAFETY: the pointer was derived from its own disjoint `&mut Node`
        // during one arena pass, the order list holds each node at most
        // once, and the store stays exclusively borrowed for 'a.
        let node = unsafe { &mut *ptr.as_ptr() };
        let Node { key, value, .. } = node;
        (EntryRef::new(k), &*key, value)
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (EntryRef, &'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.order.next().map(Self::resolve)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.order.next_back().map(Self::resolve)
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.order.len()
    }
}

impl<K, V> core::iter::FusedIterator for IterMut<'_, K, V> {}
