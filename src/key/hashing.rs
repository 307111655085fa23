//! Hashing strategies: strict or permissive, typed or untyped.
//!
//! | `strict` | `typed` | Behaviour                                              |
//! |----------|---------|--------------------------------------------------------|
//! | false    | false   | structural walk, `1 == 1.0` (memoizer default)         |
//! | false    | true    | structural walk, leaves tagged ([`HIPPIE_HASHING`])    |
//! | true     | false   | every argument must be natively hashable               |
//! | true     | true    | as above, leaves tagged                                |
//!
//! Both modes present the call as `[positional-as-list, keywords-as-map]`
//! and produce `Seq[Seq(args), Map(kwargs)]`: the argument containers always
//! go through the container path, never through a native hash of an
//! argument tuple that may hold mutable members.

use crate::args::CallArgs;
use crate::error::KeyError;
use crate::key::codec;
use crate::key::{CacheKey, KeyFunction};
use crate::value::{Scalar, TypeTag, Value};

/// Typed, permissive strategy.
///
/// Stateless, so a single constant instance serves everywhere a default
/// typed structural key is wanted.
pub const HIPPIE_HASHING: Hashing = Hashing {
    typed: true,
    strict: false,
};

/// A built-in key derivation strategy.
///
/// # Example
///
/// ```
/// use memokit::key::{Hashing, KeyFunction};
/// use memokit::{CallArgs, Value};
///
/// let untyped = Hashing::new(false, false);
/// let typed = Hashing::new(true, false);
/// let int_call = CallArgs::new().arg(1);
/// let float_call = CallArgs::new().arg(1.0);
///
/// assert_eq!(untyped.derive(&int_call), untyped.derive(&float_call));
/// assert_ne!(typed.derive(&int_call), typed.derive(&float_call));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hashing {
    /// Attach each leaf's runtime type to the key.
    pub typed: bool,
    /// Require native hashability of every argument.
    pub strict: bool,
}

/// Returns the key function for the given options.
pub fn build_key_function(typed: bool, strict: bool) -> Hashing {
    Hashing::new(typed, strict)
}

impl Hashing {
    pub const fn new(typed: bool, strict: bool) -> Self {
        Self { typed, strict }
    }

    /// Untyped strategy that walks mutable containers.
    pub const fn permissive() -> Self {
        Self::new(false, false)
    }

    /// Untyped strategy that requires natively hashable arguments.
    pub const fn strict() -> Self {
        Self::new(false, true)
    }

    /// Returns a copy with the `typed` option changed.
    pub const fn with_typed(self, typed: bool) -> Self {
        Self { typed, ..self }
    }

    /// Builds `Seq[Seq(args), Map(kwargs)]`, keying each argument with `leaf`.
    fn derive_with(
        &self,
        args: &CallArgs,
        leaf: fn(&Value, bool) -> Result<CacheKey, KeyError>,
    ) -> Result<CacheKey, KeyError> {
        let positional = args
            .positional()
            .iter()
            .map(|value| leaf(value, self.typed))
            .collect::<Result<Vec<_>, _>>()?;
        // `keywords()` is already sorted by name
        let keywords = args
            .keywords()
            .iter()
            .map(|(name, value)| {
                let name_key =
                    CacheKey::Leaf(Scalar::Str(name.clone()), self.typed.then_some(TypeTag::Str));
                Ok((name_key, leaf(value, self.typed)?))
            })
            .collect::<Result<Vec<_>, KeyError>>()?;
        Ok(CacheKey::Seq(vec![
            CacheKey::Seq(positional),
            CacheKey::Map(keywords),
        ]))
    }
}

impl KeyFunction for Hashing {
    fn derive(&self, args: &CallArgs) -> Result<CacheKey, KeyError> {
        if self.strict {
            self.derive_with(args, codec::strict_leaf)
        } else {
            self.derive_with(args, codec::canonicalize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_args;

    #[test]
    fn hippie_hashing_is_typed_and_permissive() {
        assert!(HIPPIE_HASHING.typed);
        assert!(!HIPPIE_HASHING.strict);
        assert_eq!(Hashing::default(), Hashing::permissive());
        assert_eq!(build_key_function(true, false), HIPPIE_HASHING);
    }

    #[test]
    fn permissive_accepts_mutable_arguments() {
        let args = call_args!(Value::list([1, 2, 3]); opts = Value::map([("a", 1)]));
        assert!(Hashing::permissive().derive(&args).is_ok());
        assert!(HIPPIE_HASHING.derive(&args).is_ok());
    }

    #[test]
    fn strict_rejects_mutable_arguments() {
        let list_arg = call_args!(Value::list([1, 2, 3]));
        let map_kwarg = call_args!(; opts = Value::map([("a", 1)]));
        assert!(matches!(
            Hashing::strict().derive(&list_arg),
            Err(KeyError::StrictHash { .. })
        ));
        assert!(matches!(
            Hashing::strict().derive(&map_kwarg),
            Err(KeyError::StrictHash { .. })
        ));
    }

    #[test]
    fn strict_accepts_hashable_arguments() {
        let hashing = Hashing::strict();
        let a = hashing.derive(&call_args!(1, "x", Value::tuple([1, 2]); k = 3)).unwrap();
        let b = hashing.derive(&call_args!(1, "x", Value::tuple([1, 2]); k = 3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn strict_and_permissive_agree_on_hashable_calls() {
        let args = call_args!(1, "x"; k = 2.5, j = ());
        for typed in [false, true] {
            assert_eq!(
                Hashing::new(typed, true).derive(&args).unwrap(),
                Hashing::new(typed, false).derive(&args).unwrap(),
            );
        }
    }

    #[test]
    fn permissive_key_is_the_structural_key_of_the_call() {
        let args = call_args!(Value::list([1, 2]), "x"; opts = Value::map([("a", 1)]), n = 3);
        let call = Value::List(vec![
            Value::List(args.positional().to_vec()),
            Value::map(args.keywords().iter().map(|(k, v)| (k.as_str(), v.clone()))),
        ]);
        for typed in [false, true] {
            assert_eq!(
                Hashing::new(typed, false).derive(&args).unwrap(),
                codec::canonicalize(&call, typed).unwrap()
            );
        }
    }

    #[test]
    fn positional_and_keyword_placement_differ() {
        let hashing = Hashing::permissive();
        let positional = hashing.derive(&call_args!(1)).unwrap();
        let keyword = hashing.derive(&call_args!(; x = 1)).unwrap();
        assert_ne!(positional, keyword);
    }

    #[test]
    fn typed_strict_tags_arguments() {
        let hashing = Hashing::new(true, true);
        assert_ne!(
            hashing.derive(&call_args!(1)).unwrap(),
            hashing.derive(&call_args!(1.0)).unwrap()
        );
        assert_eq!(
            Hashing::strict().derive(&call_args!(1)).unwrap(),
            Hashing::strict().derive(&call_args!(1.0)).unwrap()
        );
    }

    #[test]
    fn keyword_order_is_irrelevant() {
        let a = CallArgs::new().kwarg("a", 1).kwarg("b", 2);
        let b = CallArgs::new().kwarg("b", 2).kwarg("a", 1);
        assert_eq!(
            HIPPIE_HASHING.derive(&a).unwrap(),
            HIPPIE_HASHING.derive(&b).unwrap()
        );
    }

    #[test]
    fn argument_count_matters() {
        let hashing = Hashing::permissive();
        assert_ne!(
            hashing.derive(&call_args!(1)).unwrap(),
            hashing.derive(&call_args!(1, 1)).unwrap()
        );
        assert_ne!(
            hashing.derive(&call_args!()).unwrap(),
            hashing.derive(&call_args!(())).unwrap()
        );
    }
}
