//! memokit: function memoization with structural key derivation.
//!
//! Wraps a function taking dynamic call arguments so repeated calls with
//! equal arguments are served from a pluggable store. Keys are derived by
//! content, so mutable containers (lists, sets, maps) and nested structures
//! memoize as well as plain scalars do.
//!
//! ## Architecture
//!
//! ```text
//!   CallArgs ──► KeyFunction ──► CacheKey ──► Memoized ──► StoreMut
//!   (Value)      (Hashing)       (codec)      (Mutex)      (HashMap/Lru/Weight)
//! ```
//!
//! ## Key Components
//!
//! - [`value`]: the [`Value`] argument model and its hashable [`Scalar`](value::Scalar) form.
//! - [`key`]: [`CacheKey`], the structural codec and [`Hashing`] strategies.
//! - [`store`]: store traits and concrete stores.
//! - [`memo`]: the [`Memoized`] wrapper.
//! - [`adapter`]: decorated callable shapes.
//! - [`builder`]: configuration-driven construction.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::{CallArgs, KeyError, Value, call_args, memoize};
//!
//! let total = memoize(|args: &CallArgs| -> Result<i64, KeyError> {
//!     let Some(Value::List(items)) = args.get(0) else {
//!         return Err(KeyError::custom("expected a list"));
//!     };
//!     Ok(items
//!         .iter()
//!         .filter_map(|item| match item {
//!             Value::Int(n) => Some(*n),
//!             _ => None,
//!         })
//!         .sum())
//! });
//!
//! assert_eq!(*total.call(&call_args!(Value::list([1, 2, 3])))?, 6);
//! assert_eq!(*total.call(&call_args!(Value::list([1, 2, 3])))?, 6);
//! assert_eq!(total.info().hits, 1);
//! # Ok::<(), KeyError>(())
//! ```

pub mod adapter;
pub mod args;
pub mod builder;
pub mod error;
pub mod key;
pub mod memo;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod prelude;
pub mod store;
pub mod value;

pub use args::CallArgs;
pub use error::{ConfigError, KeyError};
pub use key::{CacheKey, HIPPIE_HASHING, Hashing, KeyFunction, build_key_function};
pub use memo::{CacheInfo, Memoized, infallible, memoize, wrap};
pub use value::Value;
