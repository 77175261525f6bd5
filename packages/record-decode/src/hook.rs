//! Value-rewriting hooks that run ahead of kind dispatch.
//!
//! A hook inspects the source value and the target [`Shape`] and may
//! rewrite the value before the decoder sees it. Hooks run at every node
//! of a decode, in registration order; each receives the output of the
//! previous one. Returning `Ok(None)` means "does not apply". A failing
//! hook aborts its own path and is folded into the aggregate like any
//! other per-path error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use record_types::{Kind, Value};

use crate::config::Config;
use crate::decode::Shape;

/// A single hook in the chain.
pub type DecodeHook = Box<dyn Fn(&Value, &Shape) -> anyhow::Result<Option<Value>> + Send + Sync>;

impl Config {
    /// Threads the value through every registered hook in order.
    pub(crate) fn run_hooks(&self, value: &Value, shape: &Shape) -> anyhow::Result<Option<Value>> {
        let mut current: Option<Value> = None;
        for hook in self.hooks() {
            let input = current.as_ref().unwrap_or(value);
            if let Some(rewritten) = hook(input, shape)? {
                current = Some(rewritten);
            }
        }
        Ok(current)
    }
}

/// Splits a string source on `separator` for sequence targets.
///
/// An empty string becomes an empty sequence rather than a sequence of one
/// empty element.
pub fn string_to_seq(separator: impl Into<String>) -> DecodeHook {
    let separator = separator.into();
    Box::new(move |value, shape| {
        let Value::String(raw) = value else {
            return Ok(None);
        };
        if shape.kind != Kind::Seq {
            return Ok(None);
        }
        if raw.is_empty() {
            return Ok(Some(Value::Seq(Vec::new())));
        }
        let parts = raw
            .split(separator.as_str())
            .map(|part| Value::String(part.to_string()))
            .collect();
        Ok(Some(Value::Seq(parts)))
    })
}

/// Parses duration literals (`300ms`, `1.5h`, `1h30m`) for
/// [`std::time::Duration`] targets. A bare number has no unit and fails.
pub fn string_to_duration() -> DecodeHook {
    Box::new(|value, shape| {
        let Value::String(raw) = value else {
            return Ok(None);
        };
        if !shape.is::<std::time::Duration>() {
            return Ok(None);
        }
        let nanos = parse_duration(raw)
            .map_err(|reason| anyhow::anyhow!("invalid duration {raw:?}: {reason}"))?;
        Ok(Some(Value::Uint(nanos)))
    })
}

/// Parses string sources with a caller-supplied `chrono` layout for
/// date/time targets, re-emitting the canonical RFC 3339 form the temporal
/// impls accept.
pub fn string_to_datetime(format: impl Into<String>) -> DecodeHook {
    let format = format.into();
    Box::new(move |value, shape| {
        let Value::String(raw) = value else {
            return Ok(None);
        };
        let temporal = shape.is::<DateTime<Utc>>()
            || shape.is::<NaiveDateTime>()
            || shape.is::<NaiveDate>();
        if !temporal {
            return Ok(None);
        }
        let parsed = NaiveDateTime::parse_from_str(raw, &format)
            .or_else(|_| {
                NaiveDate::parse_from_str(raw, &format).map(|date| date.and_time(NaiveTime::MIN))
            })
            .map_err(|err| {
                anyhow::anyhow!("cannot parse {raw:?} with layout {format:?}: {err}")
            })?;
        Ok(Some(Value::String(parsed.and_utc().to_rfc3339())))
    })
}

/// Renders scalar and byte sources as text for string targets, independent
/// of the config's weak mode.
pub fn weakly_typed() -> DecodeHook {
    Box::new(|value, shape| {
        if shape.kind != Kind::String {
            return Ok(None);
        }
        Ok(match value {
            Value::Bool(true) => Some(Value::String("1".to_string())),
            Value::Bool(false) => Some(Value::String("0".to_string())),
            Value::Int(i) => Some(Value::String(i.to_string())),
            Value::Uint(u) => Some(Value::String(u.to_string())),
            Value::Float(f) => Some(Value::String(format!("{f}"))),
            Value::Bytes(b) => Some(Value::String(String::from_utf8_lossy(b).into_owned())),
            _ => None,
        })
    })
}

const NANOS_PER_UNIT: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 6e10),
    ("h", 3.6e12),
];

/// Duration-literal grammar: one or more `<decimal><unit>` segments.
fn parse_duration(input: &str) -> Result<u64, String> {
    if input == "0" {
        return Ok(0);
    }
    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if rest.is_empty() {
        return Err("empty literal".to_string());
    }
    if rest.starts_with('-') {
        return Err("negative durations are not representable".to_string());
    }

    let mut total = 0.0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("expected a number at {rest:?}"));
        }
        let number: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("malformed number {:?}", &rest[..number_len]))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        let scale = NANOS_PER_UNIT
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| {
                if unit.is_empty() {
                    "missing unit".to_string()
                } else {
                    format!("unknown unit {unit:?}")
                }
            })?;
        rest = &rest[unit_len..];
        total += number * scale;
    }
    Ok(total as u64)
}
