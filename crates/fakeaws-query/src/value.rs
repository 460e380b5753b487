//! Nested values produced by decoding and consumed by encoding

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A decoded value tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Blob(Bytes),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Structure(Structure),
    List(Vec<Value>),
    Map(Vec<MapEntry>),
}

impl Value {
    /// Human readable variant name, used in mismatch errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Blob(_) => "blob",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Timestamp(_) => "timestamp",
            Value::Structure(_) => "structure",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Structure> for Value {
    fn from(value: Structure) -> Self {
        Value::Structure(value)
    }
}

/// One key/value pair of a map value. The value may be absent when the
/// wire form only carried the key.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Value,
    pub value: Option<Value>,
}

impl MapEntry {
    pub fn new(key: Value, value: Option<Value>) -> Self {
        Self { key, value }
    }
}

/// Present members of a structure, keyed by native member name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    fields: BTreeMap<String, Value>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Insert `value` if present, leaving the member absent otherwise
    pub fn set(&mut self, name: impl Into<String>, value: Option<Value>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Builder-style insert, handy in tests
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Remove and return a member; the typed bridge consumes members this way
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}
