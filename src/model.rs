use std::cmp::Ordering;
use std::collections::HashMap;

/// A typed runtime value produced by parsing and casting.
///
/// Every option resolves to a `Value` (or to nothing, when unspecified with no
/// default).
/// Multi-valued options resolve to [`Value::List`] in input order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean, as produced by flag options.
    Bool(bool),
    /// A signed integer, as produced by the `int` and `range` casts.
    Int(i64),
    /// A float, as produced by the `float` cast.
    Float(f64),
    /// A plain string; the raw form of every command line token.
    Str(String),
    /// An ordered list of values, as produced by `multiple()` options and ranges.
    List(Vec<Value>),
}

impl Value {
    /// Whether this value reads as "specified" for dependency purposes.
    /// Only a boolean `false` reads as unspecified; `0` and `""` are specified.
    pub(crate) fn specifies(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    /// Compare two values where a standard ordering exists.
    /// Int/Float compare numerically, Str lexically, Bool with false < true.
    /// Everything else is incomparable.
    pub(crate) fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(inner) => write!(f, "{inner}"),
            Value::Int(inner) => write!(f, "{inner}"),
            Value::Float(inner) => write!(f, "{inner}"),
            Value::Str(inner) => write!(f, "{inner}"),
            Value::List(inner) => {
                let items: Vec<String> = inner.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

/// The result of one successful command line invocation.
///
/// A flat mapping from canonical (localized) option name to resolved value,
/// covering every registered option; unspecified options with no default map
/// to nothing.
/// Tokens that matched neither a label nor the unspecified-default slot are
/// recorded as [extras](Parsed::extras).
///
/// `Parsed` is ephemeral - it belongs to a single invocation and carries no
/// state back into the [`Parser`](crate::Parser).
#[derive(Debug, PartialEq)]
pub struct Parsed {
    values: HashMap<String, Option<Value>>,
    extras: Vec<String>,
}

impl Parsed {
    pub(crate) fn new(values: HashMap<String, Option<Value>>, extras: Vec<String>) -> Self {
        Self { values, extras }
    }

    /// The resolved value of `name`, or `None` when the option is unspecified
    /// (and has no default) or unknown.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(|value| value.as_ref())
    }

    /// The resolved integer value of `name`.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Int(inner)) => Some(*inner),
            _ => None,
        }
    }

    /// The resolved float value of `name`.
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Value::Float(inner)) => Some(*inner),
            _ => None,
        }
    }

    /// The resolved string value of `name`.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Str(inner)) => Some(inner.as_str()),
            _ => None,
        }
    }

    /// The resolved flag value of `name`; `false` when absent or not a flag.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Value::Bool(true)))
    }

    /// The resolved list value of `name`, as produced by `multiple()` options
    /// and ranges.
    pub fn list(&self, name: &str) -> Option<&[Value]> {
        match self.get(name) {
            Some(Value::List(inner)) => Some(inner.as_slice()),
            _ => None,
        }
    }

    /// The tokens that matched neither a label nor the unspecified-default slot.
    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    /// The canonical names of every registered option.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Whether `name` reads as "specified" for dependency purposes.
    pub(crate) fn specifies(&self, name: &str) -> bool {
        self.get(name).map(Value::specifies).unwrap_or(false)
    }
}

/// The outcome of the pure parse pipeline.
///
/// The reserved `help` option short-circuits the pipeline before validation,
/// so a help request is a successful outcome rather than an error.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The command line parsed, cast, and validated cleanly.
    Values(Parsed),
    /// The reserved `help` option was specified; no validation was run.
    Help,
}

impl Outcome {
    /// Unwrap the parsed values; panics on a help request.
    /// Intended for tests and embedders that pre-filter help.
    pub fn values(self) -> Parsed {
        match self {
            Outcome::Values(parsed) => parsed,
            Outcome::Help => panic!("help requested; no values were parsed"),
        }
    }
}
