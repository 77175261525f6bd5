//! Temporal targets: durations and calendar timestamps.
//!
//! Durations are integer nanosecond counts and accept anything the signed
//! coercer accepts. Timestamps decode from text only: RFC 3339, then the
//! SQL result formats (`2006-01-02 15:04:05[.frac]`, `2006-01-02`), which
//! is what row scanners hand over. Custom layouts go through the
//! [`crate::hook::string_to_datetime`] hook.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use record_types::{Kind, Value};

use crate::config::Config;
use crate::decode::scalar::coerce_signed;
use crate::decode::Decode;
use crate::error::{DecodeError, ErrorBag};

impl Decode for Duration {
    const KIND: Kind = Kind::Int;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        let nanos = coerce_signed(config, path, value, errors, "Duration", i64::MIN, i64::MAX)?;
        if nanos < 0 {
            errors.push(DecodeError::overflow(path, nanos, "Duration"));
            return None;
        }
        Some(Duration::from_nanos(nanos as u64))
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

macro_rules! impl_decode_timestamp {
    ($ty:ty, $name:literal, $finish:expr) => {
        impl Decode for $ty {
            const KIND: Kind = Kind::Struct;

            fn decode_value(
                _config: &Config,
                path: &str,
                value: &Value,
                errors: &mut ErrorBag,
            ) -> Option<Self> {
                match value {
                    Value::String(raw) => match parse_timestamp(raw) {
                        Some(dt) => {
                            let finish: fn(NaiveDateTime) -> $ty = $finish;
                            Some(finish(dt))
                        }
                        None => {
                            errors.push(DecodeError::unparsable(path, raw, $name));
                            None
                        }
                    },
                    other => {
                        errors.push(DecodeError::mismatch(path, $name, other.kind()));
                        None
                    }
                }
            }
        }
    };
}

impl_decode_timestamp!(DateTime<Utc>, "DateTime", |dt| dt.and_utc());
impl_decode_timestamp!(NaiveDateTime, "NaiveDateTime", |dt| dt);
impl_decode_timestamp!(NaiveDate, "NaiveDate", |dt| dt.date());

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_one<T: Decode>(config: &Config, value: Value) -> Option<T> {
        let mut bag = ErrorBag::new();
        let out = config.decode_at::<T>("ts", &value, &mut bag);
        assert!(bag.is_empty() == out.is_some());
        out
    }

    #[test]
    fn duration_from_integer_nanoseconds() {
        let c = Config::default();
        assert_eq!(
            decode_one::<Duration>(&c, Value::Uint(1_500_000_000)).unwrap(),
            Duration::from_millis(1500)
        );
        assert_eq!(
            decode_one::<Duration>(&c, Value::Number("250".into())).unwrap(),
            Duration::from_nanos(250)
        );
        // Negative counts are unrepresentable.
        assert!(decode_one::<Duration>(&c, Value::Int(-1)).is_none());
    }

    #[test]
    fn timestamps_accept_sql_and_rfc3339_text() {
        let c = Config::default();
        let expected = NaiveDate::from_ymd_opt(2010, 5, 5)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();

        assert_eq!(
            decode_one::<NaiveDateTime>(&c, Value::String("2010-05-05 12:30:00".into())).unwrap(),
            expected
        );
        assert_eq!(
            decode_one::<DateTime<Utc>>(&c, Value::String("2010-05-05T12:30:00+00:00".into()))
                .unwrap(),
            expected.and_utc()
        );
        assert_eq!(
            decode_one::<NaiveDate>(&c, Value::String("2010-05-05".into())).unwrap(),
            expected.date()
        );
    }

    #[test]
    fn unparsable_and_mismatched_timestamps() {
        let c = Config::default();
        let mut bag = ErrorBag::new();
        let out: Option<NaiveDateTime> =
            c.decode_at("ts", &Value::String("soon".into()), &mut bag);
        assert!(out.is_none());
        assert!(matches!(
            bag.into_aggregate("t"),
            Some(DecodeError::Aggregate(_))
        ));

        let mut bag = ErrorBag::new();
        let out: Option<DateTime<Utc>> = c.decode_at("ts", &Value::Int(0), &mut bag);
        assert!(out.is_none());
        assert_eq!(bag.len(), 1);
    }
}
