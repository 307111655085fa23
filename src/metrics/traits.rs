//! # Metrics Traits
//!
//! Reading and publishing are split into two small traits so monitoring
//! stays decoupled from the memoizer:
//!
//! ```text
//!   Memoized ──► MetricsSnapshotProvider<S> ──► S ──► MetricsExporter<S>
//!                (CacheInfo, StoreMetrics,          (PrometheusTextExporter)
//!                 MemoMetricsSnapshot)
//! ```
//!
//! Recording needs no trait of its own: the wrapper counts hits and misses
//! under its lock and each store keeps its own counters.

use crate::key::{CacheKey, KeyFunction};
use crate::memo::{CacheInfo, Memoized};
use crate::store::traits::{StoreMetrics, StoreMut};

/// Snapshot provider for monitoring, benches and tests.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}

/// Wrapper statistics together with the store's own counters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoMetricsSnapshot {
    pub info: CacheInfo,
    pub store: StoreMetrics,
}

impl<F, S, V, K> MetricsSnapshotProvider<CacheInfo> for Memoized<F, S, V, K>
where
    S: StoreMut<CacheKey, V>,
    K: KeyFunction,
{
    fn snapshot(&self) -> CacheInfo {
        self.info()
    }
}

impl<F, S, V, K> MetricsSnapshotProvider<StoreMetrics> for Memoized<F, S, V, K>
where
    S: StoreMut<CacheKey, V>,
    K: KeyFunction,
{
    fn snapshot(&self) -> StoreMetrics {
        self.store_metrics()
    }
}

impl<F, S, V, K> MetricsSnapshotProvider<MemoMetricsSnapshot> for Memoized<F, S, V, K>
where
    S: StoreMut<CacheKey, V>,
    K: KeyFunction,
{
    fn snapshot(&self) -> MemoMetricsSnapshot {
        // one lock per read; the two halves may straddle a concurrent call
        MemoMetricsSnapshot {
            info: self.info(),
            store: self.store_metrics(),
        }
    }
}
