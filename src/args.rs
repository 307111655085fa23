//! Call signatures: positional arguments plus named keyword arguments.

use std::collections::BTreeMap;

use crate::value::Value;

/// The arguments of one call.
///
/// Keyword arguments are kept in a `BTreeMap`, so names are unique and
/// iteration is sorted by name regardless of insertion order.
///
/// # Example
///
/// ```
/// use memokit::{CallArgs, Value, call_args};
///
/// let a = CallArgs::new().arg(1).arg("x").kwarg("limit", 10);
/// let b = call_args!(1, "x"; limit = 10);
/// assert_eq!(a, b);
/// assert_eq!(a.positional()[1], Value::from("x"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keywords: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds arguments from existing parts.
    pub fn from_parts(positional: Vec<Value>, keywords: BTreeMap<String, Value>) -> Self {
        Self {
            positional,
            keywords,
        }
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument, replacing any previous value for `name`.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    /// Inserts `value` as the first positional argument.
    pub fn prepend(mut self, value: impl Into<Value>) -> Self {
        self.positional.insert(0, value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    /// Returns the positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Returns the keyword argument called `name`.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    /// Total number of arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    /// Splits into positional and keyword parts.
    pub fn into_parts(self) -> (Vec<Value>, BTreeMap<String, Value>) {
        (self.positional, self.keywords)
    }
}

/// Builds [`CallArgs`]: positional arguments, then `;` and `name = value`
/// keyword arguments.
///
/// ```
/// use memokit::call_args;
///
/// let args = call_args!(1, 2.5; verbose = true);
/// assert_eq!(args.len(), 3);
/// let only_keywords = call_args!(; page = 2);
/// assert!(only_keywords.positional().is_empty());
/// ```
#[macro_export]
macro_rules! call_args {
    ($($arg:expr),* $(,)? $(; $($name:ident = $value:expr),* $(,)?)?) => {{
        #[allow(unused_mut)]
        let mut args = $crate::CallArgs::new();
        $(args = args.arg($arg);)*
        $($(args = args.kwarg(stringify!($name), $value);)*)?
        args
    }};
}
