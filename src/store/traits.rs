//! Storage backends for memoized results.
//!
//! Stores own cached values and decide whether an insert is accepted; the
//! memoizing wrapper owns hit/miss accounting and synchronization. Stores
//! are therefore not required to be thread-safe: the wrapper serializes all
//! access behind its own lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Snapshot of store-level metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreMetrics {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub removes: u64,
    pub evictions: u64,
    pub rejections: u64,
}

/// Signal returned when a store declines a value.
///
/// Not an error for memoization: the value is simply not cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value rejected by store")]
pub struct StoreRejected;

/// Store metric counters.
///
/// Atomics let `&self` lookups record hits and misses.
#[derive(Debug, Default)]
pub(crate) struct StoreCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    removes: AtomicU64,
    evictions: AtomicU64,
    rejections: AtomicU64,
}

impl StoreCounters {
    pub(crate) fn snapshot(&self) -> StoreMetrics {
        StoreMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
        }
    }

    /// Records a lookup outcome and passes the result through.
    pub(crate) fn record_lookup<T>(&self, found: Option<T>) -> Option<T> {
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub(crate) fn inc_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Read-side store operations.
pub trait StoreCore<K, V> {
    /// Fetch a value by key without touching access order.
    fn get(&self, key: &K) -> Option<Arc<V>>;

    /// Check if a key exists.
    fn contains(&self, key: &K) -> bool;

    /// Current number of entries.
    fn len(&self) -> usize;

    /// Check if the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity limit, or `None` when unbounded.
    fn max_capacity(&self) -> Option<usize>;

    /// Occupancy measured in the same unit as [`max_capacity`](Self::max_capacity).
    ///
    /// Entry-counted stores report `len()`; weighted stores report total weight.
    fn current_size(&self) -> usize {
        self.len()
    }

    /// Snapshot the store's current metrics.
    fn metrics(&self) -> StoreMetrics {
        StoreMetrics::default()
    }

    /// Short name of the store type, reported in cache info.
    fn kind(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

/// Write-side store operations.
pub trait StoreMut<K, V>: StoreCore<K, V> {
    /// Lookup that may update access bookkeeping (e.g. recency).
    fn fetch(&mut self, key: &K) -> Option<Arc<V>> {
        self.get(key)
    }

    /// Insert or update a value. Returns the previous value if present.
    /// Returns `StoreRejected` if the store declines the value.
    fn try_insert(&mut self, key: K, value: Arc<V>) -> Result<Option<Arc<V>>, StoreRejected>;

    /// Remove a value by key.
    fn remove(&mut self, key: &K) -> Option<Arc<V>>;

    /// Remove all entries.
    fn clear(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_record_lookups() {
        let counters = StoreCounters::default();
        assert_eq!(counters.record_lookup(Some(1)), Some(1));
        assert_eq!(counters.record_lookup::<i32>(None), None);
        counters.inc_insert();
        counters.inc_rejection();
        let snapshot = counters.snapshot();
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.inserts, 1);
        assert_eq!(snapshot.rejections, 1);
        assert_eq!(snapshot.evictions, 0);
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name::<StoreMetrics>(), "StoreMetrics");
        assert_eq!(short_type_name::<Vec<Option<u8>>>(), "Vec");
        assert_eq!(short_type_name::<u64>(), "u64");
    }

    #[test]
    fn rejection_displays() {
        assert_eq!(StoreRejected.to_string(), "value rejected by store");
    }
}
