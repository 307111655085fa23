//! Bounded store with least-recently-used eviction.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, usize> ──► slots: Vec<Option<Node>>
//!                                     │
//!   head (MRU) ◄──prev── node ──next──► tail (LRU)
//! ```
//!
//! Nodes live in a slot vector and link to each other by index; freed slots
//! are recycled through a free list. `fetch` and `try_insert` move the entry
//! to the MRU end; inserting a new key into a full store evicts the tail.
//! A zero-capacity store rejects every insert.

use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::store::PREALLOCATE_LIMIT;
use crate::store::traits::{StoreCore, StoreCounters, StoreMetrics, StoreMut, StoreRejected};

#[derive(Debug)]
struct Node<K, V> {
    prev: Option<usize>,
    next: Option<usize>,
    key: K,
    value: Arc<V>,
}

/// LRU-evicting store bounded by entry count.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use memokit::store::lru::LruStore;
/// use memokit::store::traits::{StoreCore, StoreMut};
///
/// let mut store = LruStore::new(2);
/// store.try_insert(1, Arc::new("one")).unwrap();
/// store.try_insert(2, Arc::new("two")).unwrap();
/// store.fetch(&1); // 2 is now least recently used
/// store.try_insert(3, Arc::new("three")).unwrap();
/// assert!(!store.contains(&2));
/// assert!(store.contains(&1));
/// ```
#[derive(Debug)]
pub struct LruStore<K, V> {
    index: FxHashMap<K, usize>,
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    capacity: usize,
    metrics: StoreCounters,
}

impl<K, V> LruStore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        let reserve = capacity.min(PREALLOCATE_LIMIT);
        Self {
            index: FxHashMap::with_capacity_and_hasher(reserve, Default::default()),
            slots: Vec::with_capacity(reserve),
            free: Vec::new(),
            head: None,
            tail: None,
            capacity,
            metrics: StoreCounters::default(),
        }
    }

    /// Key of the least recently used entry.
    pub fn peek_lru(&self) -> Option<&K> {
        self.tail.and_then(|idx| self.node(idx)).map(|node| &node.key)
    }

    /// Keys from most to least recently used.
    pub fn keys_mru(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(node) = cursor.and_then(|idx| self.node(idx)) {
            keys.push(&node.key);
            cursor = node.next;
        }
        keys
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, Arc<V>)> {
        let idx = self.tail?;
        let node = self.release(idx)?;
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }

    fn node(&self, idx: usize) -> Option<&Node<K, V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn allocate(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            },
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            },
        }
    }

    /// Unlinks the node at `idx` and frees its slot.
    fn release(&mut self, idx: usize) -> Option<Node<K, V>> {
        self.detach(idx);
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        Some(node)
    }

    fn detach(&mut self, idx: usize) {
        let Some((prev, next)) = self.node(idx).map(|node| (node.prev, node.next)) else {
            return;
        };
        self.link_next(prev, next);
        self.link_prev(next, prev);
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        self.link_prev(old_head, Some(idx));
        self.head = Some(idx);
    }

    /// Points `at.next` (or `head` when `at` is `None`) to `next`.
    fn link_next(&mut self, at: Option<usize>, next: Option<usize>) {
        match at {
            Some(idx) => {
                if let Some(node) = self.node_mut(idx) {
                    node.next = next;
                }
            },
            None => self.head = next,
        }
    }

    /// Points `at.prev` (or `tail` when `at` is `None`) to `prev`.
    fn link_prev(&mut self, at: Option<usize>, prev: Option<usize>) {
        match at {
            Some(idx) => {
                if let Some(node) = self.node_mut(idx) {
                    node.prev = prev;
                }
            },
            None => self.tail = prev,
        }
    }

    fn touch(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.detach(idx);
            self.attach_front(idx);
        }
    }
}

impl<K, V> StoreCore<K, V> for LruStore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn get(&self, key: &K) -> Option<Arc<V>> {
        let found = self
            .index
            .get(key)
            .and_then(|&idx| self.node(idx))
            .map(|node| Arc::clone(&node.value));
        self.metrics.record_lookup(found)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn max_capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }

    fn metrics(&self) -> StoreMetrics {
        self.metrics.snapshot()
    }
}

impl<K, V> StoreMut<K, V> for LruStore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fetch(&mut self, key: &K) -> Option<Arc<V>> {
        let idx = self.index.get(key).copied();
        if let Some(idx) = idx {
            self.touch(idx);
        }
        let found = idx
            .and_then(|idx| self.node(idx))
            .map(|node| Arc::clone(&node.value));
        self.metrics.record_lookup(found)
    }

    fn try_insert(&mut self, key: K, value: Arc<V>) -> Result<Option<Arc<V>>, StoreRejected> {
        if self.capacity == 0 {
            self.metrics.inc_rejection();
            return Err(StoreRejected);
        }

        if let Some(&idx) = self.index.get(&key) {
            self.touch(idx);
            let node = self.node_mut(idx).ok_or(StoreRejected)?;
            let previous = std::mem::replace(&mut node.value, value);
            self.metrics.inc_update();
            return Ok(Some(previous));
        }

        if self.index.len() >= self.capacity && self.pop_lru().is_some() {
            self.metrics.inc_eviction();
        }

        let idx = self.allocate(Node {
            prev: None,
            next: None,
            key: key.clone(),
            value,
        });
        self.index.insert(key, idx);
        self.attach_front(idx);
        self.metrics.inc_insert();
        Ok(None)
    }

    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let idx = self.index.remove(key)?;
        let node = self.release(idx)?;
        self.metrics.inc_remove();
        Some(node.value)
    }

    fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }
}
