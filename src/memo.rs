//! The memoizing wrapper.
//!
//! ## Call Path
//!
//! ```text
//!   call(args)
//!     │
//!     ├── key = key_fn.derive(args)?          errors propagate, nothing counted
//!     │
//!     ├── lock ─► store.fetch(key)
//!     │             ├── hit  ─► hits += 1, return cached
//!     │             └── miss ─► misses += 1
//!     │   unlock
//!     │
//!     ├── value = func(args)?                  runs without the lock
//!     │
//!     └── lock ─► store.try_insert(key, value) rejection is swallowed
//!         unlock, return value
//! ```
//!
//! ## Thread Safety
//!
//! One `parking_lot::Mutex` guards the counters and the store. The wrapped
//! function runs outside it, so slow computations for different keys never
//! serialize. Two threads missing on the same key both compute and both
//! insert; the last insert wins.
//!
//! ## Clearing
//!
//! [`Memoized::clear`] empties the store but keeps the hit/miss counters.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::args::CallArgs;
use crate::error::KeyError;
use crate::key::{CacheKey, Hashing, KeyFunction};
use crate::store::hashmap::HashMapStore;
use crate::store::traits::{StoreCore, StoreMetrics, StoreMut};

/// Snapshot of a memoized function's cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheInfo {
    /// Short type name of the backing store.
    pub store_kind: String,
    pub hits: u64,
    pub misses: u64,
    /// Store capacity, `None` when unbounded.
    pub max_capacity: Option<usize>,
    /// Store occupancy in the unit of `max_capacity`.
    pub current_size: usize,
}

impl CacheInfo {
    /// Total calls that reached the store.
    pub fn calls(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of calls served from the store, `0.0` before any call.
    pub fn hit_ratio(&self) -> f64 {
        match self.calls() {
            0 => 0.0,
            calls => self.hits as f64 / calls as f64,
        }
    }
}

struct MemoState<S> {
    store: S,
    hits: u64,
    misses: u64,
}

/// A function wrapped with a result cache.
///
/// `F` is called as `Fn(&CallArgs) -> Result<V, E>`; its error type must
/// absorb [`KeyError`] so key derivation failures reach the caller unchanged
/// through the same channel.
///
/// # Example
///
/// ```
/// use memokit::{CallArgs, KeyError, Value, memoize};
///
/// let square = memoize(|args: &CallArgs| -> Result<i64, KeyError> {
///     match args.get(0) {
///         Some(Value::Int(n)) => Ok(n * n),
///         _ => Err(KeyError::custom("expected an integer")),
///     }
/// });
///
/// assert_eq!(*square.call(&CallArgs::new().arg(7))?, 49);
/// assert_eq!(*square.call(&CallArgs::new().arg(7))?, 49);
/// let info = square.info();
/// assert_eq!((info.hits, info.misses), (1, 1));
/// # Ok::<(), KeyError>(())
/// ```
pub struct Memoized<F, S, V, K = Hashing> {
    func: F,
    key_fn: K,
    state: Mutex<MemoState<S>>,
    _value: PhantomData<fn() -> V>,
}

impl<F, S, V, K> Memoized<F, S, V, K>
where
    S: StoreMut<CacheKey, V>,
    K: KeyFunction,
{
    /// Wraps `func` with `store` and `key_fn`.
    pub fn new(func: F, store: S, key_fn: K) -> Self {
        Self {
            func,
            key_fn,
            state: Mutex::new(MemoState {
                store,
                hits: 0,
                misses: 0,
            }),
            _value: PhantomData,
        }
    }

    /// Calls the wrapped function through the cache.
    pub fn call<E>(&self, args: &CallArgs) -> Result<Arc<V>, E>
    where
        F: Fn(&CallArgs) -> Result<V, E>,
        E: From<KeyError>,
    {
        let key = self.key_fn.derive(args)?;

        {
            let mut state = self.state.lock();
            if let Some(value) = state.store.fetch(&key) {
                state.hits += 1;
                trace!(hits = state.hits, "memoized call hit");
                return Ok(value);
            }
            state.misses += 1;
            trace!(misses = state.misses, "memoized call miss");
        }

        let value = Arc::new((self.func)(args)?);

        let mut state = self.state.lock();
        if state.store.try_insert(key, Arc::clone(&value)).is_err() {
            debug!(
                store = state.store.kind(),
                "store rejected memoized value, returning it uncached"
            );
        }
        Ok(value)
    }

    /// Consistent snapshot of counters and store occupancy.
    pub fn info(&self) -> CacheInfo {
        let state = self.state.lock();
        CacheInfo {
            store_kind: state.store.kind().to_owned(),
            hits: state.hits,
            misses: state.misses,
            max_capacity: state.store.max_capacity(),
            current_size: state.store.current_size(),
        }
    }

    /// Empties the store. Hit and miss counters keep accumulating.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.store.clear();
        debug!(store = state.store.kind(), "memoization store cleared");
    }

    /// Drops the cached result for `args`, if any.
    ///
    /// Returns `Ok(true)` when an entry was removed.
    pub fn invalidate(&self, args: &CallArgs) -> Result<bool, KeyError> {
        let key = self.key_fn.derive(args)?;
        Ok(self.state.lock().store.remove(&key).is_some())
    }

    /// Store-level metrics (inserts, rejections, evictions, ...).
    pub fn store_metrics(&self) -> StoreMetrics {
        self.state.lock().store.metrics()
    }

    pub fn key_function(&self) -> &K {
        &self.key_fn
    }

    /// The undecorated function.
    pub fn function(&self) -> &F {
        &self.func
    }

    /// Splits the wrapper into function, store and key function.
    pub fn into_parts(self) -> (F, S, K) {
        let state = self.state.into_inner();
        (self.func, state.store, self.key_fn)
    }
}

impl<F, S, V, K> fmt::Debug for Memoized<F, S, V, K>
where
    S: StoreMut<CacheKey, V>,
    K: KeyFunction + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("key_fn", &self.key_fn)
            .field("info", &self.info())
            .finish()
    }
}

/// Wraps `func` with an explicit store and key function.
pub fn wrap<F, S, V, E, K>(func: F, store: S, key_fn: K) -> Memoized<F, S, V, K>
where
    F: Fn(&CallArgs) -> Result<V, E>,
    S: StoreMut<CacheKey, V>,
    K: KeyFunction,
{
    Memoized::new(func, store, key_fn)
}

/// Wraps `func` with an unbounded hash map and untyped permissive hashing.
pub fn memoize<F, V, E>(func: F) -> Memoized<F, HashMapStore<CacheKey, V>, V>
where
    F: Fn(&CallArgs) -> Result<V, E>,
{
    Memoized::new(func, HashMapStore::unbounded(), Hashing::default())
}

/// Adapts a function that cannot fail to the `Result` shape `Memoized` calls.
pub fn infallible<V>(
    func: impl Fn(&CallArgs) -> V,
) -> impl Fn(&CallArgs) -> Result<V, KeyError> {
    move |args: &CallArgs| Ok(func(args))
}
