//! Dynamic argument values and their natively hashable canonical form.
//!
//! ## Architecture
//!
//! ```text
//!   Value ──to_scalar()──► Some((Scalar, TypeTag))   natively hashable
//!     │                    None                       mutable container / opaque
//!     │
//!     ├── None, Bool, Int, Float, Str, Bytes          always hashable
//!     ├── Tuple, FrozenSet                            hashable iff all members are
//!     ├── List, Set, Map                              never hashable
//!     └── Opaque                                      never hashable, not a container
//! ```
//!
//! ## Numeric Normalization
//!
//! [`Scalar`] equality follows value equality rather than representation:
//! `true == 1`, `1.0 == 1`, `-0.0 == 0` and every NaN is the same value.
//! The runtime type survives separately as a [`TypeTag`], which typed key
//! derivation attaches to each leaf.
//!
//! ## Ordering
//!
//! `Scalar` is totally ordered so sets and mappings can be sorted into a
//! deterministic layout: `None < numbers < Str < Bytes < Tuple < FrozenSet`.
//! Numbers compare numerically across integers and floats; NaN sorts after
//! every other number.
//!
//! `Value` is an owned tree, so reference cycles cannot be expressed.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// A single call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Immutable sequence; hashable when every member is.
    Tuple(Vec<Value>),
    /// Immutable set; hashable when every member is.
    FrozenSet(Vec<Value>),
    /// Mutable sequence.
    List(Vec<Value>),
    /// Mutable set.
    Set(Vec<Value>),
    /// Mutable mapping as key/value pairs.
    Map(Vec<(Value, Value)>),
    /// An object that is neither hashable nor a container.
    Opaque(Opaque),
}

/// Placeholder for an argument whose type exposes no hash and no structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    type_name: Cow<'static, str>,
}

impl Opaque {
    pub fn new(type_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl Value {
    /// Builds a [`Value::List`].
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::Tuple`].
    pub fn tuple<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::Set`].
    pub fn set<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::FrozenSet`].
    pub fn frozenset<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::FrozenSet(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::Map`] from key/value pairs.
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a [`Value::Bytes`].
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(data.into())
    }

    /// Builds a [`Value::Opaque`] of the named type.
    pub fn opaque(type_name: impl Into<Cow<'static, str>>) -> Self {
        Self::Opaque(Opaque::new(type_name))
    }

    /// Name of the runtime type, used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Tuple(_) => "tuple",
            Self::FrozenSet(_) => "frozenset",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Opaque(opaque) => opaque.type_name(),
        }
    }

    /// Returns `true` if the value has a native hash.
    pub fn is_hashable(&self) -> bool {
        self.to_scalar().is_some()
    }

    /// Converts a natively hashable value into its canonical form and type.
    ///
    /// Returns `None` for mutable containers, opaque values, and immutable
    /// containers holding any of those.
    pub fn to_scalar(&self) -> Option<(Scalar, TypeTag)> {
        match self {
            Self::None => Some((Scalar::None, TypeTag::None)),
            Self::Bool(b) => Some((Scalar::Int(i64::from(*b)), TypeTag::Bool)),
            Self::Int(i) => Some((Scalar::Int(*i), TypeTag::Int)),
            Self::Float(f) => Some((Scalar::from_f64(*f), TypeTag::Float)),
            Self::Str(s) => Some((Scalar::Str(s.clone()), TypeTag::Str)),
            Self::Bytes(b) => Some((Scalar::Bytes(b.clone()), TypeTag::Bytes)),
            Self::Tuple(items) => {
                let (scalars, tags) = items
                    .iter()
                    .map(Value::to_scalar)
                    .collect::<Option<Vec<_>>>()?
                    .into_iter()
                    .unzip();
                Some((Scalar::Tuple(scalars), TypeTag::Tuple(tags)))
            },
            Self::FrozenSet(items) => {
                let mut members = items
                    .iter()
                    .map(Value::to_scalar)
                    .collect::<Option<Vec<_>>>()?;
                // stable sort: the first of several equal members is kept
                members.sort_by(|a, b| a.0.cmp(&b.0));
                members.dedup_by(|later, kept| later.0 == kept.0);
                let (scalars, tags) = members.into_iter().unzip();
                Some((Scalar::FrozenSet(scalars), TypeTag::FrozenSet(tags)))
            },
            Self::List(_) | Self::Set(_) | Self::Map(_) | Self::Opaque(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// Canonical form of a natively hashable value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    None,
    Int(i64),
    /// Non-integral, out of `i64` range, infinite or NaN.
    Float(CanonicalFloat),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Scalar>),
    /// Members sorted and deduplicated.
    FrozenSet(Vec<Scalar>),
}

impl Scalar {
    /// Normalizes a float: integral values in `i64` range become `Int`.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::Float(CanonicalFloat(f64::NAN));
        }
        if value.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&value) {
            return Self::Int(value as i64);
        }
        Self::Float(CanonicalFloat(value))
    }

    fn rank(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Str(_) => 2,
            Self::Bytes(_) => 3,
            Self::Tuple(_) => 4,
            Self::FrozenSet(_) => 5,
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::None, Self::None) => Ordering::Equal,
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.cmp(b),
            (Self::Int(a), Self::Float(b)) => cmp_int_float(*a, b.get()),
            (Self::Float(a), Self::Int(b)) => cmp_int_float(*b, a.get()).reverse(),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Bytes(a), Self::Bytes(b)) => a.cmp(b),
            (Self::Tuple(a), Self::Tuple(b)) => a.cmp(b),
            (Self::FrozenSet(a), Self::FrozenSet(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Compares an integer with a normalized float.
///
/// A normalized float is never integral within `i64` range, so the result
/// is never `Equal`.
fn cmp_int_float(int: i64, float: f64) -> Ordering {
    if float.is_nan() || float >= I64_UPPER {
        return Ordering::Less;
    }
    if float < I64_LOWER {
        return Ordering::Greater;
    }
    if int <= float.floor() as i64 {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Float compared and hashed by bit pattern.
///
/// Only produced by [`Scalar::from_f64`], which folds `-0.0` into the integer
/// zero and collapses NaN payloads, so bit equality is value equality.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalFloat(f64);

impl CanonicalFloat {
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for CanonicalFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for CanonicalFloat {}

impl Hash for CanonicalFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for CanonicalFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ---------------------------------------------------------------------------
// TypeTag
// ---------------------------------------------------------------------------

/// Runtime type of a natively hashable value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    None,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    Tuple(Vec<TypeTag>),
    /// Member tags in the order of the canonical members.
    FrozenSet(Vec<TypeTag>),
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::None
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Opaque> for Value {
    fn from(value: Opaque) -> Self {
        Self::Opaque(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

impl<T: Into<Value>> From<HashSet<T>> for Value {
    fn from(items: HashSet<T>) -> Self {
        Self::set(items)
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(items: BTreeSet<T>) -> Self {
        Self::set(items)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(pairs: HashMap<K, V>) -> Self {
        Self::map(pairs)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(pairs: BTreeMap<K, V>) -> Self {
        Self::map(pairs)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Self::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::Tuple(vec![a.into(), b.into(), c.into()])
    }
}
