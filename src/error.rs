//! Error types for the memokit library.
//!
//! ## Key Components
//!
//! - [`KeyError`]: Returned when a cache key cannot be derived from call
//!   arguments (unkeyable values, strict hashing on mutable containers, or a
//!   failing custom key function).
//! - [`ConfigError`]: Returned when memoization configuration parameters are
//!   invalid (e.g. zero capacity).
//!
//! Key errors travel through the wrapped function's own error type: a
//! memoized function returning `Result<V, E>` requires `E: From<KeyError>`,
//! so the cache never wraps the caller's errors in a type of its own.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::error::KeyError;
//! use memokit::key::{Hashing, KeyFunction};
//! use memokit::{CallArgs, Value};
//!
//! let args = CallArgs::new().arg(Value::list([1, 2, 3]));
//!
//! // Permissive hashing walks the list structurally
//! assert!(Hashing::new(false, false).derive(&args).is_ok());
//!
//! // Strict hashing refuses it
//! let err = Hashing::new(false, true).derive(&args).unwrap_err();
//! assert!(matches!(err, KeyError::StrictHash { .. }));
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// KeyError
// ---------------------------------------------------------------------------

/// Error returned when call arguments cannot be turned into a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The value is neither natively hashable nor a sequence, set or mapping.
    #[error("cannot derive a key for value of type `{type_name}`; supply a custom key function")]
    Unkeyable { type_name: String },

    /// Strict hashing was requested and the value has no native hash.
    #[error("value of type `{type_name}` is not hashable and strict hashing is enabled")]
    StrictHash { type_name: String },

    /// Raised by a user-supplied key function.
    #[error("key function failed: {0}")]
    Custom(String),
}

impl KeyError {
    /// Creates a [`KeyError::Custom`] with the given description.
    #[inline]
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Returns the type name of the offending value, if known.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Unkeyable { type_name } | Self::StrictHash { type_name } => Some(type_name),
            Self::Custom(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when memoization configuration parameters are invalid.
///
/// Produced by [`MemoizeBuilder::try_build`](crate::builder::MemoizeBuilder::try_build)
/// and [`StorePolicy::validate`](crate::builder::StorePolicy::validate).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use memokit::builder::StorePolicy;
///
/// let err = StorePolicy::Lru { capacity: 0 }.validate().unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
