//! Scalar coercion: the strict conversion matrix plus weak-mode widening.
//!
//! Strict mode accepts only the natural conversions (numeric kinds between
//! each other, exact kind matches); weak mode additionally parses strings,
//! renders scalars as text, and folds booleans to 0/1. Numeric literal
//! wrappers ([`Value::Number`]) convert to any numeric target in either
//! mode, since they are numbers that merely arrived as text.

use record_types::{Kind, Value};

use crate::config::Config;
use crate::decode::Decode;
use crate::error::{DecodeError, ErrorBag};

fn mismatch(path: &str, expected: &'static str, value: &Value) -> DecodeError {
    DecodeError::mismatch(path, expected, value.kind())
}

fn overflow(path: &str, value: impl std::fmt::Display, target: &'static str) -> DecodeError {
    DecodeError::overflow(path, value, target)
}

fn unparsable(path: &str, literal: &str, target: &'static str) -> DecodeError {
    DecodeError::unparsable(path, literal, target)
}

/// Unsigned integer literal with base detection: `0x`/`0o`/`0b` prefixes,
/// otherwise decimal.
fn parse_uint_literal(s: &str) -> Option<u64> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        u64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()
    } else {
        s.parse::<u64>().ok()
    }
}

fn parse_int_literal(s: &str) -> Option<i64> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let magnitude = parse_uint_literal(body)?;
    if negative {
        match magnitude.cmp(&(i64::MAX as u64 + 1)) {
            std::cmp::Ordering::Greater => None,
            std::cmp::Ordering::Equal => Some(i64::MIN),
            std::cmp::Ordering::Less => Some(-(magnitude as i64)),
        }
    } else {
        i64::try_from(magnitude).ok()
    }
}

pub(super) fn coerce_signed(
    config: &Config,
    path: &str,
    value: &Value,
    errors: &mut ErrorBag,
    target: &'static str,
    min: i64,
    max: i64,
) -> Option<i64> {
    let out = match value {
        Value::Int(i) => *i,
        Value::Uint(u) => {
            if *u > i64::MAX as u64 {
                errors.push(overflow(path, u, target));
                return None;
            }
            *u as i64
        }
        Value::Float(f) => {
            let truncated = f.trunc();
            if !truncated.is_finite()
                || truncated < i64::MIN as f64
                || truncated > i64::MAX as f64
            {
                errors.push(overflow(path, f, target));
                return None;
            }
            truncated as i64
        }
        Value::Number(text) => match text.parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                errors.push(unparsable(path, text, target));
                return None;
            }
        },
        Value::Bool(b) if config.weakly_typed => i64::from(*b),
        Value::String(s) if config.weakly_typed => match parse_int_literal(s) {
            Some(v) => v,
            None => {
                errors.push(unparsable(path, s, target));
                return None;
            }
        },
        other => {
            errors.push(mismatch(path, target, other));
            return None;
        }
    };
    if out < min || out > max {
        errors.push(overflow(path, out, target));
        return None;
    }
    Some(out)
}

fn coerce_unsigned(
    config: &Config,
    path: &str,
    value: &Value,
    errors: &mut ErrorBag,
    target: &'static str,
    max: u64,
) -> Option<u64> {
    let out = match value {
        Value::Uint(u) => *u,
        Value::Int(i) => {
            if *i < 0 && !config.weakly_typed {
                errors.push(overflow(path, i, target));
                return None;
            }
            // Weak mode keeps the two's-complement bits.
            *i as u64
        }
        Value::Float(f) => {
            if *f < 0.0 && !config.weakly_typed {
                errors.push(overflow(path, f, target));
                return None;
            }
            let truncated = f.trunc();
            if !truncated.is_finite() || truncated > u64::MAX as f64 {
                errors.push(overflow(path, f, target));
                return None;
            }
            truncated as u64
        }
        Value::Number(text) => {
            if let Some(stripped) = text.strip_prefix('-') {
                if !config.weakly_typed {
                    errors.push(overflow(path, text, target));
                    return None;
                }
                match stripped.parse::<u64>() {
                    Ok(m) => (m as i64).wrapping_neg() as u64,
                    Err(_) => {
                        errors.push(unparsable(path, text, target));
                        return None;
                    }
                }
            } else {
                match text.parse::<u64>() {
                    Ok(v) => v,
                    Err(_) => {
                        errors.push(unparsable(path, text, target));
                        return None;
                    }
                }
            }
        }
        Value::Bool(b) if config.weakly_typed => u64::from(*b),
        Value::String(s) if config.weakly_typed => match parse_uint_literal(s) {
            Some(v) => v,
            None => {
                errors.push(unparsable(path, s, target));
                return None;
            }
        },
        other => {
            errors.push(mismatch(path, target, other));
            return None;
        }
    };
    if out > max {
        errors.push(overflow(path, out, target));
        return None;
    }
    Some(out)
}

fn coerce_float(
    config: &Config,
    path: &str,
    value: &Value,
    errors: &mut ErrorBag,
    target: &'static str,
    narrow: bool,
) -> Option<f64> {
    let out = match value {
        Value::Float(f) => *f,
        Value::Int(i) => *i as f64,
        Value::Uint(u) => *u as f64,
        Value::Number(text) => match text.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                errors.push(unparsable(path, text, target));
                return None;
            }
        },
        Value::Bool(b) if config.weakly_typed => f64::from(u8::from(*b)),
        Value::String(s) if config.weakly_typed => match s.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                errors.push(unparsable(path, s, target));
                return None;
            }
        },
        other => {
            errors.push(mismatch(path, target, other));
            return None;
        }
    };
    if narrow && out.is_finite() && out.abs() > f32::MAX as f64 {
        errors.push(overflow(path, out, target));
        return None;
    }
    Some(out)
}

macro_rules! impl_decode_signed {
    ($($ty:ty),* $(,)?) => {$(
        impl Decode for $ty {
            const KIND: Kind = Kind::Int;

            fn decode_value(
                config: &Config,
                path: &str,
                value: &Value,
                errors: &mut ErrorBag,
            ) -> Option<Self> {
                coerce_signed(
                    config,
                    path,
                    value,
                    errors,
                    stringify!($ty),
                    <$ty>::MIN as i64,
                    <$ty>::MAX as i64,
                )
                .map(|v| v as $ty)
            }
        }
    )*};
}

macro_rules! impl_decode_unsigned {
    ($($ty:ty),* $(,)?) => {$(
        impl Decode for $ty {
            const KIND: Kind = Kind::Uint;

            fn decode_value(
                config: &Config,
                path: &str,
                value: &Value,
                errors: &mut ErrorBag,
            ) -> Option<Self> {
                coerce_unsigned(config, path, value, errors, stringify!($ty), <$ty>::MAX as u64)
                    .map(|v| v as $ty)
            }
        }
    )*};
}

impl_decode_signed!(i8, i16, i32, i64, isize);
impl_decode_unsigned!(u8, u16, u32, u64, usize);

impl Decode for f64 {
    const KIND: Kind = Kind::Float;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        coerce_float(config, path, value, errors, "f64", false)
    }
}

impl Decode for f32 {
    const KIND: Kind = Kind::Float;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        coerce_float(config, path, value, errors, "f32", true).map(|v| v as f32)
    }
}

const TRUE_LITERALS: &[&str] = &["1", "t", "T", "TRUE", "true", "True"];
const FALSE_LITERALS: &[&str] = &["0", "f", "F", "FALSE", "false", "False"];

impl Decode for bool {
    const KIND: Kind = Kind::Bool;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Int(i) if config.weakly_typed => Some(*i != 0),
            Value::Uint(u) if config.weakly_typed => Some(*u != 0),
            Value::Float(f) if config.weakly_typed => Some(*f != 0.0),
            Value::String(s) | Value::Number(s) if config.weakly_typed => {
                if s.is_empty() || FALSE_LITERALS.contains(&s.as_str()) {
                    Some(false)
                } else if TRUE_LITERALS.contains(&s.as_str()) {
                    Some(true)
                } else {
                    errors.push(unparsable(path, s, "bool"));
                    None
                }
            }
            other => {
                errors.push(mismatch(path, "bool", other));
                None
            }
        }
    }
}

impl Decode for String {
    const KIND: Kind = Kind::String;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            // The literal text of a numeric wrapper, no weak mode needed.
            Value::Number(n) => Some(n.clone()),
            Value::Bool(b) if config.weakly_typed => {
                Some(if *b { "1" } else { "0" }.to_string())
            }
            Value::Int(i) if config.weakly_typed => Some(i.to_string()),
            Value::Uint(u) if config.weakly_typed => Some(u.to_string()),
            Value::Float(f) if config.weakly_typed => Some(format!("{f}")),
            Value::Bytes(b) if config.weakly_typed => {
                Some(String::from_utf8_lossy(b).into_owned())
            }
            other => {
                errors.push(mismatch(path, "String", other));
                None
            }
        }
    }
}
