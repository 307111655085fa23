//! Configuration-driven construction of memoized functions.
//!
//! Picks a backing store from a [`StorePolicy`] and a key function from the
//! `typed` / `strict` flags, hiding the concrete store type behind
//! [`AnyStore`].
//!
//! ## Example
//!
//! ```rust
//! use memokit::builder::{MemoizeBuilder, StorePolicy};
//! use memokit::{CallArgs, KeyError};
//!
//! let len = MemoizeBuilder::new()
//!     .typed(true)
//!     .policy(StorePolicy::Lru { capacity: 128 })
//!     .try_build(|args: &CallArgs| -> Result<usize, KeyError> { Ok(args.len()) })
//!     .unwrap();
//!
//! assert_eq!(*len.call(&CallArgs::new().arg(1).arg(2)).unwrap(), 2);
//! assert_eq!(len.info().store_kind, "LruStore");
//! assert_eq!(len.info().max_capacity, Some(128));
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::adapter::Decorated;
use crate::args::CallArgs;
use crate::error::ConfigError;
use crate::key::{CacheKey, Hashing};
use crate::memo::Memoized;
use crate::store::hashmap::HashMapStore;
use crate::store::lru::LruStore;
use crate::store::traits::{StoreCore, StoreMetrics, StoreMut, StoreRejected};
use crate::store::weight::WeightStore;

/// Weighs a cached value for [`StorePolicy::Weighted`].
pub type Weigher<V> = fn(&V) -> usize;

/// Available backing store policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum StorePolicy {
    /// Hash map without a bound.
    #[default]
    Unbounded,
    /// Hash map holding at most `capacity` entries; further keys go uncached.
    Bounded { capacity: usize },
    /// Least recently used eviction at `capacity` entries.
    Lru { capacity: usize },
    /// Total value weight capped at `max_weight`; oversized values go uncached.
    Weighted {
        max_weight: usize,
        max_entries: Option<usize>,
    },
}

impl StorePolicy {
    /// Checks that every bound is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Unbounded => Ok(()),
            Self::Bounded { capacity: 0 } | Self::Lru { capacity: 0 } => Err(ConfigError::new(
                "capacity must be greater than zero",
            )),
            Self::Bounded { .. } | Self::Lru { .. } => Ok(()),
            Self::Weighted { max_weight: 0, .. } => Err(ConfigError::new(
                "weight capacity must be greater than zero",
            )),
            Self::Weighted {
                max_entries: Some(0),
                ..
            } => Err(ConfigError::new("entry capacity must be greater than zero")),
            Self::Weighted { .. } => Ok(()),
        }
    }
}

/// Serializable memoization settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemoizeConfig {
    /// Include runtime types in keys (`1` and `1.0` cache separately).
    pub typed: bool,
    /// Refuse arguments that are not natively hashable.
    pub strict: bool,
    pub policy: StorePolicy,
}

impl MemoizeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()
    }

    /// Key function selected by `typed` and `strict`.
    pub fn hashing(&self) -> Hashing {
        Hashing::new(self.typed, self.strict)
    }
}

/// Store chosen at runtime from a [`StorePolicy`].
pub enum AnyStore<V> {
    HashMap(HashMapStore<CacheKey, V>),
    Lru(LruStore<CacheKey, V>),
    Weighted(WeightStore<CacheKey, V, Weigher<V>>),
}

impl<V> AnyStore<V> {
    /// Creates the store described by `policy`.
    ///
    /// `weigher` only matters for [`StorePolicy::Weighted`].
    pub fn from_policy(policy: StorePolicy, weigher: Weigher<V>) -> Result<Self, ConfigError> {
        policy.validate()?;
        let store = match policy {
            StorePolicy::Unbounded => Self::HashMap(HashMapStore::unbounded()),
            StorePolicy::Bounded { capacity } => Self::HashMap(HashMapStore::bounded(capacity)),
            StorePolicy::Lru { capacity } => Self::Lru(LruStore::new(capacity)),
            StorePolicy::Weighted {
                max_weight,
                max_entries,
            } => Self::Weighted(WeightStore::with_capacity(
                max_entries.unwrap_or(usize::MAX),
                max_weight,
                weigher,
            )),
        };
        Ok(store)
    }
}

impl<V> fmt::Debug for AnyStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyStore")
            .field("kind", &self.kind())
            .field("len", &self.len())
            .field("max_capacity", &self.max_capacity())
            .finish()
    }
}

impl<V> StoreCore<CacheKey, V> for AnyStore<V> {
    fn get(&self, key: &CacheKey) -> Option<Arc<V>> {
        match self {
            Self::HashMap(store) => store.get(key),
            Self::Lru(store) => store.get(key),
            Self::Weighted(store) => store.get(key),
        }
    }

    fn contains(&self, key: &CacheKey) -> bool {
        match self {
            Self::HashMap(store) => store.contains(key),
            Self::Lru(store) => store.contains(key),
            Self::Weighted(store) => store.contains(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::HashMap(store) => store.len(),
            Self::Lru(store) => store.len(),
            Self::Weighted(store) => store.len(),
        }
    }

    fn max_capacity(&self) -> Option<usize> {
        match self {
            Self::HashMap(store) => store.max_capacity(),
            Self::Lru(store) => store.max_capacity(),
            Self::Weighted(store) => store.max_capacity(),
        }
    }

    fn current_size(&self) -> usize {
        match self {
            Self::HashMap(store) => store.current_size(),
            Self::Lru(store) => store.current_size(),
            Self::Weighted(store) => store.current_size(),
        }
    }

    fn metrics(&self) -> StoreMetrics {
        match self {
            Self::HashMap(store) => store.metrics(),
            Self::Lru(store) => store.metrics(),
            Self::Weighted(store) => store.metrics(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::HashMap(store) => store.kind(),
            Self::Lru(store) => store.kind(),
            Self::Weighted(store) => store.kind(),
        }
    }
}

impl<V> StoreMut<CacheKey, V> for AnyStore<V> {
    fn fetch(&mut self, key: &CacheKey) -> Option<Arc<V>> {
        match self {
            Self::HashMap(store) => store.fetch(key),
            Self::Lru(store) => store.fetch(key),
            Self::Weighted(store) => store.fetch(key),
        }
    }

    fn try_insert(&mut self, key: CacheKey, value: Arc<V>) -> Result<Option<Arc<V>>, StoreRejected> {
        match self {
            Self::HashMap(store) => store.try_insert(key, value),
            Self::Lru(store) => store.try_insert(key, value),
            Self::Weighted(store) => store.try_insert(key, value),
        }
    }

    fn remove(&mut self, key: &CacheKey) -> Option<Arc<V>> {
        match self {
            Self::HashMap(store) => store.remove(key),
            Self::Lru(store) => store.remove(key),
            Self::Weighted(store) => store.remove(key),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::HashMap(store) => store.clear(),
            Self::Lru(store) => store.clear(),
            Self::Weighted(store) => store.clear(),
        }
    }
}

/// A memoized function assembled by [`MemoizeBuilder`].
pub type BuiltMemoized<F, V> = Memoized<F, AnyStore<V>, V, Hashing>;

/// Builder for memoized functions.
pub struct MemoizeBuilder<V> {
    config: MemoizeConfig,
    weigher: Weigher<V>,
}

impl<V> MemoizeBuilder<V> {
    /// Untyped, permissive, unbounded.
    pub fn new() -> Self {
        Self::from_config(MemoizeConfig::default())
    }

    pub fn from_config(config: MemoizeConfig) -> Self {
        Self {
            config,
            weigher: |_| std::mem::size_of::<V>(),
        }
    }

    pub fn typed(mut self, typed: bool) -> Self {
        self.config.typed = typed;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn policy(mut self, policy: StorePolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Weight function for [`StorePolicy::Weighted`].
    ///
    /// Defaults to the inline size of `V`.
    pub fn weigher(mut self, weigher: Weigher<V>) -> Self {
        self.weigher = weigher;
        self
    }

    pub fn config(&self) -> &MemoizeConfig {
        &self.config
    }

    /// Builds only the store.
    pub fn build_store(&self) -> Result<AnyStore<V>, ConfigError> {
        AnyStore::from_policy(self.config.policy, self.weigher)
    }

    /// Wraps `func` according to the configuration.
    pub fn try_build<F, E>(self, func: F) -> Result<BuiltMemoized<F, V>, ConfigError>
    where
        F: Fn(&CallArgs) -> Result<V, E>,
    {
        let store = self.build_store()?;
        debug!(
            policy = ?self.config.policy,
            typed = self.config.typed,
            strict = self.config.strict,
            "built memoized function"
        );
        Ok(Memoized::new(func, store, self.config.hashing()))
    }

    /// Wraps the callable inside `decorated` and restores its shape.
    pub fn try_build_decorated<F, E>(
        self,
        decorated: Decorated<F>,
    ) -> Result<Decorated<BuiltMemoized<F, V>>, ConfigError>
    where
        F: Fn(&CallArgs) -> Result<V, E>,
    {
        let (kind, func) = decorated.undecorate();
        Ok(kind.rewrap(self.try_build(func)?))
    }
}

impl<V> Default for MemoizeBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for MemoizeBuilder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizeBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
