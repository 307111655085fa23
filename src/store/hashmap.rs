//! HashMap-backed store.
//!
//! ## Architecture
//! - Keys are stored in a `HashMap<K, Arc<V>>` for O(1) lookup.
//! - Optionally bounded by entry count; a bounded store never evicts, it
//!   rejects new keys once full.
//!
//! ## Core Operations
//! - `try_insert`: insert or update by key; `StoreRejected` when full.
//! - `get`: fetch by key (updates hit/miss metrics).
//! - `remove`: delete by key.
//! - `clear`: drop all entries.
//!
//! ## When to Use
//! - The default memoization store: unbounded, like a plain dictionary.
//! - Bounded variant when a hard entry limit matters more than freshness.
//!
//! ## Example Usage
//! ```rust
//! use std::sync::Arc;
//!
//! use memokit::store::hashmap::HashMapStore;
//! use memokit::store::traits::{StoreCore, StoreMut};
//!
//! let mut store: HashMapStore<u64, String> = HashMapStore::bounded(1);
//! store.try_insert(1, Arc::new("a".to_string())).unwrap();
//! assert!(store.try_insert(2, Arc::new("b".to_string())).is_err());
//! assert!(store.contains(&1));
//! ```
//!
//! ## Type Constraints
//! - `K: Eq + Hash` for key lookup.
//! - `S: BuildHasher` for custom hashers (defaults to `RandomState`).
use std::collections::HashMap;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use crate::store::PREALLOCATE_LIMIT;
use crate::store::traits::{StoreCore, StoreCounters, StoreMetrics, StoreMut, StoreRejected};

/// HashMap-backed store with an optional entry limit.
#[derive(Debug)]
pub struct HashMapStore<K, V, S = RandomState> {
    map: HashMap<K, Arc<V>, S>,
    capacity: Option<usize>,
    metrics: StoreCounters,
}

impl<K, V> HashMapStore<K, V, RandomState>
where
    K: Eq + Hash,
{
    /// Create a store without an entry limit.
    pub fn unbounded() -> Self {
        Self::with_hasher(None, RandomState::new())
    }

    /// Create a store that rejects new keys beyond `capacity` entries.
    pub fn bounded(capacity: usize) -> Self {
        Self::with_hasher(Some(capacity), RandomState::new())
    }
}

impl<K, V> Default for HashMapStore<K, V, RandomState>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<K, V, S> HashMapStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Create a store with an optional capacity and custom hasher.
    pub fn with_hasher(capacity: Option<usize>, hasher: S) -> Self {
        let map = match capacity {
            Some(capacity) => {
                HashMap::with_capacity_and_hasher(capacity.min(PREALLOCATE_LIMIT), hasher)
            },
            None => HashMap::with_hasher(hasher),
        };
        Self {
            map,
            capacity,
            metrics: StoreCounters::default(),
        }
    }

    /// Fetch a value by key without touching access counters.
    pub fn peek(&self, key: &K) -> Option<&Arc<V>> {
        self.map.get(key)
    }

    /// Iterate over stored keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }
}

impl<K, V, S> StoreCore<K, V> for HashMapStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn get(&self, key: &K) -> Option<Arc<V>> {
        self.metrics.record_lookup(self.map.get(key).cloned())
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn max_capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn metrics(&self) -> StoreMetrics {
        self.metrics.snapshot()
    }
}

impl<K, V, S> StoreMut<K, V> for HashMapStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn try_insert(&mut self, key: K, value: Arc<V>) -> Result<Option<Arc<V>>, StoreRejected> {
        if let Some(capacity) = self.capacity {
            if !self.map.contains_key(&key) && self.map.len() >= capacity {
                self.metrics.inc_rejection();
                return Err(StoreRejected);
            }
        }
        let previous = self.map.insert(key, value);
        if previous.is_some() {
            self.metrics.inc_update();
        } else {
            self.metrics.inc_insert();
        }
        Ok(previous)
    }

    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let removed = self.map.remove(key);
        if removed.is_some() {
            self.metrics.inc_remove();
        }
        removed
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}
