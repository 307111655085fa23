//! Structural key derivation ("hippie hashing").
//!
//! Turns any [`Value`] into a [`CacheKey`] describing its *current content*.
//! No identity or address ever reaches the key, and no value is reduced to a
//! bare hash code: two different values whose hashes collide still produce
//! different keys.
//!
//! ## Algorithm
//!
//! ```text
//!   canonicalize(v)
//!     ├── v natively hashable?  ──► Leaf(scalar, tag if typed)
//!     ├── set-like              ──► Set(sorted, deduplicated member keys)
//!     ├── sequence-like         ──► Seq(member keys in order)
//!     ├── mapping-like          ──► Map((key, value) pairs sorted by key)
//!     └── anything else         ──► KeyError::Unkeyable
//! ```
//!
//! Set-like values are `Set` and any `FrozenSet` with unhashable members.
//! Sequence-like values are `List` and any `Tuple` with unhashable members.
//! Sorting makes keys independent of iteration and insertion order.

use std::cmp::Ordering;
use std::mem;

use crate::error::KeyError;
use crate::key::CacheKey;
use crate::value::Value;

/// Derives the structural key of `value`.
///
/// With `typed`, every leaf carries its runtime [`TypeTag`](crate::value::TypeTag),
/// so `1` and `1.0` produce different keys.
///
/// # Example
///
/// ```
/// use memokit::Value;
/// use memokit::key::codec::canonicalize;
///
/// let a = canonicalize(&Value::map([("a", 1), ("b", 2)]), false).unwrap();
/// let b = canonicalize(&Value::map([("b", 2), ("a", 1)]), false).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn canonicalize(value: &Value, typed: bool) -> Result<CacheKey, KeyError> {
    if let Some((scalar, tag)) = value.to_scalar() {
        return Ok(CacheKey::Leaf(scalar, typed.then_some(tag)));
    }
    match value {
        Value::Set(members) | Value::FrozenSet(members) => canonicalize_set(members, typed),
        Value::List(items) | Value::Tuple(items) => canonicalize_seq(items, typed),
        Value::Map(pairs) => canonicalize_map(pairs, typed),
        other => Err(KeyError::Unkeyable {
            type_name: other.type_name().to_owned(),
        }),
    }
}

/// Derives the key of a natively hashable value, refusing everything else.
pub fn strict_leaf(value: &Value, typed: bool) -> Result<CacheKey, KeyError> {
    value
        .to_scalar()
        .map(|(scalar, tag)| CacheKey::Leaf(scalar, typed.then_some(tag)))
        .ok_or_else(|| KeyError::StrictHash {
            type_name: value.type_name().to_owned(),
        })
}

/// Element-wise keys of a sequence, order preserved.
pub fn canonicalize_seq(items: &[Value], typed: bool) -> Result<CacheKey, KeyError> {
    items
        .iter()
        .map(|item| canonicalize(item, typed))
        .collect::<Result<Vec<_>, _>>()
        .map(CacheKey::Seq)
}

/// Sorted, deduplicated keys of a set's members.
///
/// Members whose leaves differ only by type tag (`1` and `1.0` when typed)
/// are equal members; the first occurrence is kept, as for frozen sets.
pub fn canonicalize_set(members: &[Value], typed: bool) -> Result<CacheKey, KeyError> {
    let mut keys = members
        .iter()
        .map(|member| canonicalize(member, typed))
        .collect::<Result<Vec<_>, _>>()?;
    keys.sort_by(member_order);
    keys.dedup_by(|later, kept| member_order(later, kept) == Ordering::Equal);
    Ok(CacheKey::Set(keys))
}

/// Key/value pairs sorted by key.
///
/// Duplicate keys collapse the way a mapping built from the pairs would:
/// the first key is kept with the last value.
pub fn canonicalize_map(pairs: &[(Value, Value)], typed: bool) -> Result<CacheKey, KeyError> {
    let mut entries = pairs
        .iter()
        .map(|(k, v)| Ok((canonicalize(k, typed)?, canonicalize(v, typed)?)))
        .collect::<Result<Vec<_>, KeyError>>()?;
    entries.sort_by(|a, b| member_order(&a.0, &b.0));
    entries.dedup_by(|later, kept| {
        if member_order(&later.0, &kept.0) == Ordering::Equal {
            mem::swap(&mut later.1, &mut kept.1);
            true
        } else {
            false
        }
    });
    Ok(CacheKey::Map(entries))
}

/// Orders set members and mapping keys. Leaves compare by value alone.
fn member_order(a: &CacheKey, b: &CacheKey) -> Ordering {
    match (a, b) {
        (CacheKey::Leaf(x, _), CacheKey::Leaf(y, _)) => x.cmp(y),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Scalar, TypeTag};

    fn key(value: impl Into<Value>) -> CacheKey {
        canonicalize(&value.into(), false).unwrap()
    }

    fn typed_key(value: impl Into<Value>) -> CacheKey {
        canonicalize(&value.into(), true).unwrap()
    }

    #[test]
    fn hashable_values_become_leaves() {
        assert_eq!(key(5), CacheKey::Leaf(Scalar::Int(5), None));
        assert_eq!(
            typed_key("x"),
            CacheKey::Leaf(Scalar::Str("x".into()), Some(TypeTag::Str))
        );
        assert!(key(Value::tuple([1, 2])).is_leaf());
    }

    #[test]
    fn typed_mode_separates_equal_numbers() {
        assert_eq!(key(1), key(1.0));
        assert_eq!(key(true), key(1));
        assert_ne!(typed_key(1), typed_key(1.0));
        assert_ne!(typed_key(true), typed_key(1));
    }

    #[test]
    fn typed_mode_reaches_into_tuples() {
        assert_eq!(key(Value::tuple([1])), key(Value::tuple([1.0])));
        assert_ne!(typed_key(Value::tuple([1])), typed_key(Value::tuple([1.0])));
    }

    #[test]
    fn lists_keep_order() {
        assert_ne!(key(Value::list([1, 2])), key(Value::list([2, 1])));
        assert_eq!(
            key(Value::list([1, 2])),
            CacheKey::Seq(vec![key(1), key(2)])
        );
    }

    #[test]
    fn sets_ignore_insertion_order() {
        assert_eq!(key(Value::set([3, 1, 2])), key(Value::set([1, 2, 3])));
        assert_eq!(key(Value::set([1, 1, 2])), key(Value::set([2, 1])));
    }

    #[test]
    fn typed_sets_collapse_equal_numbers_to_first_member() {
        let mixed = Value::Set(vec![Value::Int(1), Value::Float(1.0)]);
        let swapped = Value::Set(vec![Value::Float(1.0), Value::Int(1)]);
        assert_eq!(typed_key(mixed.clone()), typed_key(Value::set([1])));
        assert_eq!(typed_key(swapped.clone()), typed_key(Value::set([1.0])));
        assert_ne!(typed_key(mixed.clone()), typed_key(swapped.clone()));
        assert_eq!(key(mixed), key(swapped));
    }

    #[test]
    fn duplicate_mapping_keys_keep_the_last_value() {
        let first_wins = Value::map([("a", 1), ("a", 2)]);
        let second_wins = Value::map([("a", 2), ("a", 1)]);
        assert_eq!(key(first_wins.clone()), key(Value::map([("a", 2)])));
        assert_eq!(key(second_wins.clone()), key(Value::map([("a", 1)])));
        assert_ne!(key(first_wins), key(second_wins));
    }

    #[test]
    fn typed_mapping_keys_collapse_equal_numbers() {
        let mixed = Value::Map(vec![
            (Value::Int(1), Value::from("a")),
            (Value::Float(1.0), Value::from("b")),
        ]);
        assert_eq!(
            typed_key(mixed),
            typed_key(Value::Map(vec![(Value::Int(1), Value::from("b"))]))
        );
    }

    #[test]
    fn sets_of_unhashable_members_are_sorted_structurally() {
        let a = Value::Set(vec![Value::list([2]), Value::list([1])]);
        let b = Value::Set(vec![Value::list([1]), Value::list([2])]);
        assert_eq!(key(a), key(b));
    }

    #[test]
    fn mappings_ignore_insertion_order() {
        let a = Value::map([("a", 1), ("b", 2)]);
        let b = Value::map([("b", 2), ("a", 1)]);
        assert_eq!(key(a), key(b));
        assert_ne!(
            key(Value::map([("a", 1)])),
            key(Value::map([("a", 2)]))
        );
    }

    #[test]
    fn container_shapes_do_not_collide() {
        let pairs = Value::List(vec![Value::list([1, 2])]);
        let mapping = Value::map([(1, 2)]);
        assert_ne!(key(pairs), key(mapping));
        assert_ne!(key(Value::list([1, 2])), key(Value::set([1, 2])));
        assert_ne!(key(Value::list([1, 2])), key(Value::tuple([1, 2])));
    }

    #[test]
    fn tuples_with_mutable_members_use_sequence_path() {
        let value = Value::Tuple(vec![Value::Int(1), Value::list([2])]);
        assert_eq!(
            key(value),
            CacheKey::Seq(vec![key(1), CacheKey::Seq(vec![key(2)])])
        );
    }

    #[test]
    fn frozensets_with_mutable_members_use_set_path() {
        let value = Value::FrozenSet(vec![Value::list([2]), Value::list([1])]);
        assert_eq!(
            key(value),
            CacheKey::Set(vec![CacheKey::Seq(vec![key(1)]), CacheKey::Seq(vec![key(2)])])
        );
    }

    #[test]
    fn empty_containers_have_stable_keys() {
        assert_eq!(key(Value::List(vec![])), CacheKey::Seq(vec![]));
        assert_eq!(key(Value::Set(vec![])), CacheKey::Set(vec![]));
        assert_eq!(key(Value::Map(vec![])), CacheKey::Map(vec![]));
    }

    #[test]
    fn nested_structures_reflect_content() {
        let a = Value::map([("xs", Value::list([1, 2])), ("tag", Value::from("t"))]);
        let b = Value::map([("tag", Value::from("t")), ("xs", Value::list([1, 2]))]);
        let c = Value::map([("tag", Value::from("t")), ("xs", Value::list([1, 3]))]);
        assert_eq!(key(a.clone()), key(b));
        assert_ne!(key(a), key(c));
    }

    #[test]
    fn opaque_values_are_unkeyable() {
        let err = canonicalize(&Value::opaque("Socket"), false).unwrap_err();
        assert_eq!(
            err,
            KeyError::Unkeyable {
                type_name: "Socket".into()
            }
        );
        let nested = Value::list([Value::opaque("Socket")]);
        assert!(canonicalize(&nested, true).is_err());
    }

    #[test]
    fn strict_leaf_refuses_containers() {
        assert!(strict_leaf(&Value::Int(1), false).is_ok());
        assert!(strict_leaf(&Value::tuple([1, 2]), true).is_ok());
        let err = strict_leaf(&Value::list([1]), false).unwrap_err();
        assert!(matches!(err, KeyError::StrictHash { type_name } if type_name == "list"));
    }
}
