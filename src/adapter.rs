//! Tagged-variant shim for callables that arrive in a decorated shape.
//!
//! A callable may be a plain function, an accessor bound to a receiver, a
//! static function living on a type, or a function bound to a class. The
//! memoizer only understands plain functions, so the shape is peeled off once
//! at wrap time and reapplied around the memoized result:
//!
//! ```text
//!   Decorated<F> ──undecorate──► (CallableKind, F)
//!                                     │        │
//!                                     │      wrap(F) ──► Memoized<F, ..>
//!                                     ▼                       │
//!                               kind.rewrap(..) ◄─────────────┘
//!                                     │
//!                                     ▼
//!                         Decorated<Memoized<F, ..>>
//! ```
//!
//! An accessor's receiver and a class-bound callable's class travel as the
//! first positional argument, so they are part of the cache key.

use std::sync::Arc;

use crate::args::CallArgs;
use crate::error::KeyError;
use crate::key::{CacheKey, KeyFunction};
use crate::memo::{Memoized, wrap};
use crate::store::traits::StoreMut;
use crate::value::Value;

/// Shape a callable was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableKind {
    /// Plain function.
    Function,
    /// Read accessor taking the receiver as its only argument.
    Accessor,
    /// Function namespaced on a type, no implicit argument.
    Static,
    /// Function receiving its class as the first argument.
    ClassBound,
}

impl CallableKind {
    /// Puts `inner` back into this shape.
    pub fn rewrap<G>(self, inner: G) -> Decorated<G> {
        match self {
            Self::Function => Decorated::Function(inner),
            Self::Accessor => Decorated::Accessor(inner),
            Self::Static => Decorated::Static(inner),
            Self::ClassBound => Decorated::ClassBound(inner),
        }
    }

    /// Whether calls in this shape carry an implicit first argument.
    pub fn binds_first_argument(self) -> bool {
        matches!(self, Self::Accessor | Self::ClassBound)
    }
}

/// A callable tagged with its declared shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decorated<F> {
    Function(F),
    Accessor(F),
    Static(F),
    ClassBound(F),
}

impl<F> Decorated<F> {
    pub fn kind(&self) -> CallableKind {
        match self {
            Self::Function(_) => CallableKind::Function,
            Self::Accessor(_) => CallableKind::Accessor,
            Self::Static(_) => CallableKind::Static,
            Self::ClassBound(_) => CallableKind::ClassBound,
        }
    }

    /// The callable underneath the shape.
    pub fn inner(&self) -> &F {
        match self {
            Self::Function(f) | Self::Accessor(f) | Self::Static(f) | Self::ClassBound(f) => f,
        }
    }

    /// Separates the shape from the callable.
    pub fn undecorate(self) -> (CallableKind, F) {
        let kind = self.kind();
        let inner = match self {
            Self::Function(f) | Self::Accessor(f) | Self::Static(f) | Self::ClassBound(f) => f,
        };
        (kind, inner)
    }

    /// Transforms the callable while keeping its shape.
    pub fn map<G>(self, transform: impl FnOnce(F) -> G) -> Decorated<G> {
        let (kind, inner) = self.undecorate();
        kind.rewrap(transform(inner))
    }
}

impl<F> From<F> for Decorated<F> {
    fn from(func: F) -> Self {
        Self::Function(func)
    }
}

/// Memoizes the callable inside `decorated` and restores its shape.
pub fn wrap_decorated<F, S, V, E, K>(
    decorated: Decorated<F>,
    store: S,
    key_fn: K,
) -> Decorated<Memoized<F, S, V, K>>
where
    F: Fn(&CallArgs) -> Result<V, E>,
    S: StoreMut<CacheKey, V>,
    K: KeyFunction,
{
    decorated.map(|func| wrap(func, store, key_fn))
}

impl<F, S, V, K> Decorated<Memoized<F, S, V, K>>
where
    S: StoreMut<CacheKey, V>,
    K: KeyFunction,
{
    /// Calls with `args` exactly as given.
    pub fn call<E>(&self, args: &CallArgs) -> Result<Arc<V>, E>
    where
        F: Fn(&CallArgs) -> Result<V, E>,
        E: From<KeyError>,
    {
        self.inner().call(args)
    }

    /// Reads an accessor for `receiver`.
    pub fn get<E>(&self, receiver: impl Into<Value>) -> Result<Arc<V>, E>
    where
        F: Fn(&CallArgs) -> Result<V, E>,
        E: From<KeyError>,
    {
        self.inner().call(&CallArgs::new().arg(receiver))
    }

    /// Calls with `class` prepended to `args`.
    pub fn call_bound<E>(&self, class: impl Into<Value>, args: CallArgs) -> Result<Arc<V>, E>
    where
        F: Fn(&CallArgs) -> Result<V, E>,
        E: From<KeyError>,
    {
        self.inner().call(&args.prepend(class))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::call_args;
    use crate::key::Hashing;
    use crate::memo::infallible;
    use crate::store::hashmap::HashMapStore;

    #[test]
    fn undecorate_then_rewrap_preserves_kind() {
        for decorated in [
            Decorated::Function(1),
            Decorated::Accessor(2),
            Decorated::Static(3),
            Decorated::ClassBound(4),
        ] {
            let kind = decorated.kind();
            let (unwrapped_kind, inner) = decorated.undecorate();
            assert_eq!(kind, unwrapped_kind);
            assert_eq!(kind.rewrap(inner), decorated);
        }
    }

    #[test]
    fn map_keeps_shape() {
        let mapped = Decorated::Static(21).map(|n| n * 2);
        assert_eq!(mapped, Decorated::Static(42));
        assert_eq!(Decorated::from("f").kind(), CallableKind::Function);
        assert!(CallableKind::Accessor.binds_first_argument());
        assert!(!CallableKind::Static.binds_first_argument());
    }

    #[test]
    fn accessor_caches_per_receiver() {
        let calls = AtomicUsize::new(0);
        let area = wrap_decorated(
            Decorated::Accessor(infallible(|args: &CallArgs| {
                calls.fetch_add(1, Ordering::SeqCst);
                match args.get(0) {
                    Some(Value::Tuple(sides)) => sides.len(),
                    _ => 0,
                }
            })),
            HashMapStore::unbounded(),
            Hashing::default(),
        );
        assert_eq!(area.kind(), CallableKind::Accessor);

        let square = Value::tuple([3, 3]);
        let cube = Value::tuple([2, 2, 2]);
        assert_eq!(*area.get::<KeyError>(square.clone()).unwrap(), 2);
        assert_eq!(*area.get::<KeyError>(square).unwrap(), 2);
        assert_eq!(*area.get::<KeyError>(cube).unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(area.inner().info().hits, 1);
    }

    #[test]
    fn class_argument_is_part_of_the_key() {
        let calls = AtomicUsize::new(0);
        let make = wrap_decorated(
            Decorated::ClassBound(infallible(|args: &CallArgs| {
                calls.fetch_add(1, Ordering::SeqCst);
                args.len()
            })),
            HashMapStore::unbounded(),
            Hashing::default(),
        );
        make.call_bound::<KeyError>("Circle", call_args!(1)).unwrap();
        make.call_bound::<KeyError>("Square", call_args!(1)).unwrap();
        make.call_bound::<KeyError>("Circle", call_args!(1)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // the bound call and the explicit call derive the same key
        make.call::<KeyError>(&call_args!("Circle", 1)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
