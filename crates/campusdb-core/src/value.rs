//! Record data model.
//!
//! A [`Record`] is an open, insertion-ordered mapping from field name to a
//! scalar [`Value`]. Records serialize to plain JSON objects so a table is
//! stored as a JSON array of objects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text a missing field compares as.
pub const ABSENT: &str = "undefined";

/// Scalar field value.
///
/// Serialized untagged, so `Value::Integer(5000)` is the JSON number `5000`
/// and `Value::Null` is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON null
    Null,
    /// true / false
    Boolean(bool),
    /// Whole number
    Integer(i64),
    /// Fractional number
    Float(f64),
    /// Text
    String(String),
}

impl Value {
    /// Whether the value counts as "not provided" when deciding to generate
    /// an identifier: null, empty text, `false` and zero.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(b) => !b,
            Value::Integer(i) => *i == 0,
            Value::Float(f) => *f == 0.0 || f.is_nan(),
            Value::String(s) => s.is_empty(),
        }
    }

    /// Lower-cased text form used by equality predicates.
    pub fn match_key(&self) -> String {
        self.to_string().to_lowercase()
    }

    /// Returns the text if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) if fl.is_nan() => write!(f, "NaN"),
            Value::Float(fl) if fl.is_infinite() => {
                write!(f, "{}", if *fl > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One row: field name to value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, keeping its position if it already exists.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Returns a field's value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a field's value if it is text.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Whether the field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `(field, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Shallow merge: every field of `changes` overwrites (or is appended to)
    /// this record.
    pub fn merge(&mut self, changes: &Record) {
        for (field, value) in changes.iter() {
            self.insert(field, value.clone());
        }
    }

    /// Lower-cased text form of a field for equality predicates. A missing
    /// field compares as `"undefined"`.
    pub fn match_key(&self, field: &str) -> String {
        self.get(field)
            .map(Value::match_key)
            .unwrap_or_else(|| ABSENT.to_string())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
