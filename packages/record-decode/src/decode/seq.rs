//! Sequence and fixed-size array targets.
//!
//! Sequences commit best-effort: an element that fails to decode keeps its
//! default value and the failure is recorded under `path[i]`. Weak mode
//! additionally lifts non-sequence sources into one-element sequences,
//! treats empty mappings as empty sequences, and reinterprets string bytes
//! for byte-element targets.

use std::any::TypeId;

use record_types::{Kind, Value};

use crate::config::Config;
use crate::decode::Decode;
use crate::error::{index_path, DecodeError, ErrorBag};

fn is_byte_elem<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<u8>()
}

fn bytes_as_values(bytes: &[u8]) -> Vec<Value> {
    bytes.iter().map(|b| Value::Uint(*b as u64)).collect()
}

fn decode_elements<T: Decode + Default>(
    config: &Config,
    path: &str,
    items: &[Value],
    errors: &mut ErrorBag,
) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            config
                .decode_at::<T>(&index_path(path, i), item, errors)
                .unwrap_or_default()
        })
        .collect()
}

fn lift_one<T: Decode + Default>(
    config: &Config,
    path: &str,
    value: &Value,
    errors: &mut ErrorBag,
) -> Vec<T> {
    vec![config
        .decode_at::<T>(&index_path(path, 0), value, errors)
        .unwrap_or_default()]
}

impl<T: Decode + Default> Decode for Vec<T> {
    const KIND: Kind = Kind::Seq;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        match value {
            Value::Seq(items) => Some(decode_elements(config, path, items, errors)),
            // Byte strings are sequences of unsigned integers.
            Value::Bytes(bytes) => {
                Some(decode_elements(config, path, &bytes_as_values(bytes), errors))
            }
            Value::String(s) if config.weakly_typed && is_byte_elem::<T>() => Some(
                decode_elements(config, path, &bytes_as_values(s.as_bytes()), errors),
            ),
            Value::Map(entries) if config.weakly_typed => {
                if entries.is_empty() {
                    Some(Vec::new())
                } else {
                    Some(lift_one(config, path, value, errors))
                }
            }
            Value::Record(rec) if config.weakly_typed => {
                if rec.is_empty() {
                    Some(Vec::new())
                } else {
                    Some(lift_one(config, path, value, errors))
                }
            }
            other if config.weakly_typed => Some(lift_one(config, path, other, errors)),
            other => {
                errors.push(DecodeError::mismatch(path, "sequence", other.kind()));
                None
            }
        }
    }
}

fn decode_array<T: Decode + Default, const N: usize>(
    config: &Config,
    path: &str,
    items: &[Value],
    errors: &mut ErrorBag,
) -> Option<[T; N]> {
    if items.len() > N {
        errors.push(DecodeError::LengthExceeded {
            path: path.to_string(),
            len: items.len(),
            capacity: N,
        });
        return None;
    }
    // Always built fresh from element defaults; a short source leaves the
    // tail at its defaults.
    let mut out: [T; N] = std::array::from_fn(|_| T::default());
    for (i, item) in items.iter().enumerate() {
        if let Some(v) = config.decode_at::<T>(&index_path(path, i), item, errors) {
            out[i] = v;
        }
    }
    Some(out)
}

impl<T: Decode + Default, const N: usize> Decode for [T; N] {
    const KIND: Kind = Kind::Array;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        match value {
            Value::Seq(items) => decode_array(config, path, items, errors),
            Value::Bytes(bytes) => decode_array(config, path, &bytes_as_values(bytes), errors),
            Value::String(s) if config.weakly_typed && is_byte_elem::<T>() => {
                decode_array(config, path, &bytes_as_values(s.as_bytes()), errors)
            }
            Value::Map(entries) if config.weakly_typed && entries.is_empty() => {
                decode_array(config, path, &[], errors)
            }
            Value::Record(rec) if config.weakly_typed && rec.is_empty() => {
                decode_array(config, path, &[], errors)
            }
            other if config.weakly_typed => {
                decode_array(config, path, std::slice::from_ref(other), errors)
            }
            other => {
                errors.push(DecodeError::mismatch(path, "array", other.kind()));
                None
            }
        }
    }
}
