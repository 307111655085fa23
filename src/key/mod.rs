//! Cache keys and the key-function seam.
//!
//! ## Architecture
//!
//! ```text
//!   CallArgs ──► KeyFunction::derive ──► CacheKey
//!                     │
//!                     ├── Hashing { typed, strict }     (built-in strategies)
//!                     │       └── codec::canonicalize / codec::strict_leaf
//!                     └── Fn(&CallArgs) -> Result<..>   (custom key functions)
//! ```
//!
//! ## Key Components
//! - [`CacheKey`]: canonical, hashable, totally ordered representation of a call.
//! - [`KeyFunction`]: trait implemented by hashing strategies and closures.
//! - [`Hashing`]: strict/permissive, typed/untyped strategy.
//! - [`HIPPIE_HASHING`]: typed permissive strategy shared as a constant.

pub mod codec;
pub mod hashing;

pub use hashing::{HIPPIE_HASHING, Hashing, build_key_function};

use crate::args::CallArgs;
use crate::error::KeyError;
use crate::value::{Scalar, TypeTag};

/// Canonical representation of call arguments.
///
/// Sequences, sets and mappings produce distinct variants so that, for
/// example, a list of pairs never collides with a mapping of the same pairs.
/// `Set` members and `Map` entries are stored sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// A natively hashable value, with its type when typed hashing is on.
    Leaf(Scalar, Option<TypeTag>),
    Seq(Vec<CacheKey>),
    Set(Vec<CacheKey>),
    Map(Vec<(CacheKey, CacheKey)>),
}

impl CacheKey {
    /// Returns `true` for keys derived from a natively hashable value.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(..))
    }

    /// Number of leaves in the key.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(..) => 1,
            Self::Seq(items) | Self::Set(items) => items.iter().map(Self::leaf_count).sum(),
            Self::Map(pairs) => pairs
                .iter()
                .map(|(k, v)| k.leaf_count() + v.leaf_count())
                .sum(),
        }
    }
}

/// Derives a [`CacheKey`] from a call.
///
/// Implementations must be pure: equal arguments yield equal keys.
pub trait KeyFunction: Send + Sync {
    fn derive(&self, args: &CallArgs) -> Result<CacheKey, KeyError>;
}

impl<F> KeyFunction for F
where
    F: Fn(&CallArgs) -> Result<CacheKey, KeyError> + Send + Sync,
{
    fn derive(&self, args: &CallArgs) -> Result<CacheKey, KeyError> {
        self(args)
    }
}
