//! Projection of typed values back into dynamic form.
//!
//! Projection is the feeder for struct-sourced decodes: a typed source is
//! turned into a [`Record`] honoring the same tag table the decode side
//! reads, then decoded through the single record path. It is also where
//! `omitempty` lives; decoding never consults it.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use record_types::{Record, Value};

use crate::config::Config;
use crate::decode::fields::FieldSpec;

/// A type that can render itself as a dynamic [`Value`].
pub trait ToValue {
    fn to_value(&self, config: &Config) -> Value;
}

/// The zero test `omitempty` applies to a projected value.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Int(i) => *i == 0,
        Value::Uint(u) => *u == 0,
        Value::Float(f) => *f == 0.0,
        Value::Number(n) => n == "0",
        Value::String(s) => s.is_empty(),
        Value::Bytes(b) => b.is_empty(),
        Value::Seq(items) => items.is_empty(),
        Value::Map(pairs) => pairs.is_empty(),
        Value::Record(rec) => rec.is_empty(),
    }
}

impl Config {
    /// Places one projected field into the output record according to its
    /// descriptor: `-` drops it, `omitempty` drops zero values, flattened
    /// and remainder fields merge their entries inline.
    pub fn project_field(&self, spec: &FieldSpec, value: Value, out: &mut Record) {
        if spec.flatten || spec.is_remain(&self.tag_name) {
            match value {
                Value::Record(rec) => {
                    for (name, field_value) in rec {
                        out.push(name, field_value);
                    }
                }
                Value::Map(pairs) => {
                    for (key, entry_value) in pairs {
                        if let Value::String(name) | Value::Number(name) = key {
                            out.push(name, entry_value);
                        }
                    }
                }
                _ => {}
            }
            return;
        }
        let Some(name) = spec.resolved_name(&self.tag_name) else {
            return;
        };
        if spec.has_option(&self.tag_name, "omitempty") && is_empty_value(&value) {
            return;
        }
        out.push(name, value);
    }
}

macro_rules! impl_to_value {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {$(
        impl ToValue for $ty {
            fn to_value(&self, _: &Config) -> Value {
                Value::$variant(*self as $cast)
            }
        }
    )*};
}

impl_to_value!(
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    isize => Int as i64,
    u8 => Uint as u64,
    u16 => Uint as u64,
    u32 => Uint as u64,
    u64 => Uint as u64,
    usize => Uint as u64,
    f32 => Float as f64,
    f64 => Float as f64,
);

impl ToValue for bool {
    fn to_value(&self, _: &Config) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for String {
    fn to_value(&self, _: &Config) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for &str {
    fn to_value(&self, _: &Config) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for Value {
    fn to_value(&self, _: &Config) -> Value {
        self.clone()
    }
}

impl ToValue for Record {
    fn to_value(&self, _: &Config) -> Value {
        Value::Record(self.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self, config: &Config) -> Value {
        match self {
            Some(inner) => inner.to_value(config),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self, config: &Config) -> Value {
        Value::Seq(self.iter().map(|item| item.to_value(config)).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self, config: &Config) -> Value {
        Value::Seq(self.iter().map(|item| item.to_value(config)).collect())
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self, config: &Config) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(config), v.to_value(config)))
                .collect(),
        )
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S>
where
    S: std::hash::BuildHasher,
{
    fn to_value(&self, config: &Config) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(config), v.to_value(config)))
                .collect(),
        )
    }
}

impl ToValue for Duration {
    fn to_value(&self, _: &Config) -> Value {
        Value::Uint(u64::try_from(self.as_nanos()).unwrap_or(u64::MAX))
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self, _: &Config) -> Value {
        Value::String(self.to_rfc3339())
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self, _: &Config) -> Value {
        Value::String(self.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self, _: &Config) -> Value {
        Value::String(self.format("%Y-%m-%d").to_string())
    }
}
