//! Store bounded by the total weight of its values.
//!
//! Each value is weighed once on insert by a caller-supplied function
//! (typically a byte size). An insert that would push the total past the
//! weight budget is rejected, which the memoizer treats as "value too large,
//! do not cache".

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::store::traits::{StoreCore, StoreCounters, StoreMetrics, StoreMut, StoreRejected};

#[derive(Debug)]
struct WeightEntry<V> {
    value: Arc<V>,
    weight: usize,
}

/// HashMap-backed store that tracks total weight for values.
pub struct WeightStore<K, V, F>
where
    F: Fn(&V) -> usize,
{
    map: HashMap<K, WeightEntry<V>>,
    capacity_entries: usize,
    capacity_weight: usize,
    total_weight: usize,
    weight_fn: F,
    metrics: StoreCounters,
}

impl<K, V, F> WeightStore<K, V, F>
where
    K: Eq + Hash,
    F: Fn(&V) -> usize,
{
    /// Create a store limited only by total weight.
    pub fn new(capacity_weight: usize, weight_fn: F) -> Self {
        Self::with_capacity(usize::MAX, capacity_weight, weight_fn)
    }

    /// Create a store limited by both entry count and total weight.
    pub fn with_capacity(capacity_entries: usize, capacity_weight: usize, weight_fn: F) -> Self {
        Self {
            map: HashMap::new(),
            capacity_entries,
            capacity_weight,
            total_weight: 0,
            weight_fn,
            metrics: StoreCounters::default(),
        }
    }

    /// Returns the current total weight.
    pub fn total_weight(&self) -> usize {
        self.total_weight
    }

    /// Returns the configured weight capacity.
    pub fn capacity_weight(&self) -> usize {
        self.capacity_weight
    }

    /// Returns the configured entry capacity.
    pub fn capacity_entries(&self) -> usize {
        self.capacity_entries
    }

    fn reject(&self) -> StoreRejected {
        self.metrics.inc_rejection();
        StoreRejected
    }
}

impl<K, V, F> std::fmt::Debug for WeightStore<K, V, F>
where
    F: Fn(&V) -> usize,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightStore")
            .field("len", &self.map.len())
            .field("capacity_entries", &self.capacity_entries)
            .field("capacity_weight", &self.capacity_weight)
            .field("total_weight", &self.total_weight)
            .finish()
    }
}

impl<K, V, F> StoreCore<K, V> for WeightStore<K, V, F>
where
    K: Eq + Hash,
    F: Fn(&V) -> usize,
{
    fn get(&self, key: &K) -> Option<Arc<V>> {
        self.metrics
            .record_lookup(self.map.get(key).map(|entry| Arc::clone(&entry.value)))
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn max_capacity(&self) -> Option<usize> {
        Some(self.capacity_weight)
    }

    fn current_size(&self) -> usize {
        self.total_weight
    }

    fn metrics(&self) -> StoreMetrics {
        self.metrics.snapshot()
    }
}

impl<K, V, F> StoreMut<K, V> for WeightStore<K, V, F>
where
    K: Eq + Hash,
    F: Fn(&V) -> usize,
{
    fn try_insert(&mut self, key: K, value: Arc<V>) -> Result<Option<Arc<V>>, StoreRejected> {
        let new_weight = (self.weight_fn)(value.as_ref());
        let existing_weight = self.map.get(&key).map(|entry| entry.weight);
        if let Some(old_weight) = existing_weight {
            let next_total = (self.total_weight - old_weight).saturating_add(new_weight);
            if next_total > self.capacity_weight {
                return Err(self.reject());
            }
            let entry = self.map.get_mut(&key).ok_or(StoreRejected)?;
            let previous = std::mem::replace(&mut entry.value, value);
            entry.weight = new_weight;
            self.total_weight = next_total;
            self.metrics.inc_update();
            return Ok(Some(previous));
        }

        if self.map.len() >= self.capacity_entries
            || self.total_weight.saturating_add(new_weight) > self.capacity_weight
        {
            return Err(self.reject());
        }

        self.map.insert(
            key,
            WeightEntry {
                value,
                weight: new_weight,
            },
        );
        self.total_weight += new_weight;
        self.metrics.inc_insert();
        Ok(None)
    }

    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let entry = self.map.remove(key)?;
        self.total_weight = self.total_weight.saturating_sub(entry.weight);
        self.metrics.inc_remove();
        Some(entry.value)
    }

    fn clear(&mut self) {
        self.map.clear();
        self.total_weight = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::ptr_arg)]
    fn weight_by_len(value: &String) -> usize {
        value.len()
    }

    #[test]
    fn weight_store_tracks_weight() {
        let mut store = WeightStore::with_capacity(3, 10, weight_by_len);
        assert_eq!(store.total_weight(), 0);
        assert_eq!(store.try_insert("k1", Arc::new("aa".to_string())), Ok(None));
        assert_eq!(store.total_weight(), 2);
        assert_eq!(
            store.try_insert("k2", Arc::new("bbbb".to_string())),
            Ok(None)
        );
        assert_eq!(store.current_size(), 6);
        assert_eq!(store.remove(&"k1"), Some(Arc::new("aa".to_string())));
        assert_eq!(store.total_weight(), 4);
    }

    #[test]
    fn weight_store_rejects_oversized_values() {
        let mut store = WeightStore::new(5, weight_by_len);
        assert_eq!(
            store.try_insert("big", Arc::new("aaaaaa".to_string())),
            Err(StoreRejected)
        );
        assert!(store.is_empty());
        assert_eq!(
            store.try_insert("k1", Arc::new("aaaaa".to_string())),
            Ok(None)
        );
        assert_eq!(
            store.try_insert("k2", Arc::new("bb".to_string())),
            Err(StoreRejected)
        );
        assert_eq!(store.metrics().rejections, 2);
        assert_eq!(store.max_capacity(), Some(5));
    }

    #[test]
    fn weight_store_enforces_entry_limit() {
        let mut store = WeightStore::with_capacity(1, 100, weight_by_len);
        assert_eq!(store.try_insert("k1", Arc::new("a".to_string())), Ok(None));
        assert_eq!(
            store.try_insert("k2", Arc::new("b".to_string())),
            Err(StoreRejected)
        );
    }

    #[test]
    fn weight_store_update_adjusts_weight() {
        let mut store = WeightStore::with_capacity(10, 10, weight_by_len);
        assert_eq!(store.try_insert("k1", Arc::new("aa".to_string())), Ok(None));
        assert_eq!(store.total_weight(), 2);
        assert_eq!(
            store.try_insert("k1", Arc::new("aaaa".to_string())),
            Ok(Some(Arc::new("aa".to_string())))
        );
        assert_eq!(store.total_weight(), 4);
        assert_eq!(
            store.try_insert("k1", Arc::new("a".repeat(11))),
            Err(StoreRejected)
        );
        assert_eq!(store.get(&"k1"), Some(Arc::new("aaaa".to_string())));
    }

    #[test]
    fn clear_resets_weight() {
        let mut store = WeightStore::new(10, weight_by_len);
        store.try_insert("k1", Arc::new("abc".to_string())).unwrap();
        store.clear();
        assert_eq!(store.total_weight(), 0);
        assert!(store.is_empty());
    }
}
