//! Dynamically typed source values.

use serde::{Deserialize, Serialize};

use crate::kind::Kind;
use crate::record::Record;

/// A dynamically shaped value handed to the decoder.
///
/// Values are immutable once constructed; the decoder never mutates its
/// source. `Number` wraps a numeric literal kept as decimal text, as
/// produced by JSON readers that defer numeric interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Numeric literal kept as text; convertible to any numeric target.
    Number(String),
    String(String),
    Bytes(Vec<u8>),
    Seq(Vec<Value>),
    /// Generic mapping with arbitrary keys, in insertion order.
    Map(Vec<(Value, Value)>),
    /// Named fields in declaration order.
    Record(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Structural kind of this value.
    ///
    /// Byte strings classify as sequences (of unsigned integers) and
    /// numeric literals classify as strings, matching how the wire formats
    /// that produce them behave.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Any,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Float(_) => Kind::Float,
            Value::Number(_) | Value::String(_) => Kind::String,
            Value::Bytes(_) | Value::Seq(_) => Kind::Seq,
            Value::Map(_) => Kind::Map,
            Value::Record(_) => Kind::Struct,
        }
    }

    /// Key text when this value is usable as a field name.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Number(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Number(n) => f.write_str(n),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Seq(items) => write!(f, "<seq of {}>", items.len()),
            Value::Map(entries) => write!(f, "<map of {}>", entries.len()),
            Value::Record(rec) => write!(f, "<record of {}>", rec.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}
