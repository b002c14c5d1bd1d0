//! Query-parameter bags for list endpoints.

use std::fmt;

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Dropped at serialization time; lets callers write
    /// `set("search", q)` without branching on emptiness.
    Null,
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{}", s),
            Self::Int(n) => write!(f, "{}", n),
            Self::UInt(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for QueryValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u64> for QueryValue {
    fn from(n: u64) -> Self {
        Self::UInt(n)
    }
}

impl From<usize> for QueryValue {
    fn from(n: usize) -> Self {
        Self::UInt(n as u64)
    }
}

impl From<f64> for QueryValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<V: Into<QueryValue>> From<Option<V>> for QueryValue {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// An ordered key -> scalar bag of query parameters.
///
/// Insertion order is preserved so the serialized form is deterministic and
/// can double as a fetch dependency key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    entries: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter. Setting an existing key replaces its value in place.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, v)| matches!(v, QueryValue::Null))
    }

    /// Key/value pairs with `Null` entries dropped, ready for the wire.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter(|(_, v)| !matches!(v, QueryValue::Null))
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    /// Canonical query-string form, used both for URLs and as the dependency
    /// key that decides whether a refetch is needed.
    pub fn to_query_string(&self) -> String {
        self.pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}
