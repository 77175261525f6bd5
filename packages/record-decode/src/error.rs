//! Decode error taxonomy and the non-fail-fast accumulator.

use record_types::Kind;
use thiserror::Error;

/// A single decode failure, or the aggregate of many.
///
/// Every variant is soft: container decoders record the failure for the
/// offending path and keep decoding sibling paths. The top-level call folds
/// a non-empty [`ErrorBag`] into one [`DecodeError::Aggregate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Source kind cannot convert into the target under the active mode.
    #[error("'{path}' expected type '{expected}', got unconvertible kind '{actual}'")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: Kind,
    },

    /// Numeric value out of range for the target width or signedness.
    #[error("cannot decode '{path}': value {value} overflows {target}")]
    Overflow {
        path: String,
        value: String,
        target: &'static str,
    },

    /// Weak-mode string (or numeric literal) failed to parse.
    #[error("cannot parse '{path}' as {target}: invalid literal {literal:?}")]
    UnparsableLiteral {
        path: String,
        target: &'static str,
        literal: String,
    },

    /// Source sequence longer than the fixed-size target.
    #[error("'{path}': source sequence has {len} elements, target capacity is {capacity}")]
    LengthExceeded {
        path: String,
        len: usize,
        capacity: usize,
    },

    /// Source keys with no matching target field.
    #[error("'{path}' has invalid keys: {}", .keys.join(", "))]
    UnknownKeys { path: String, keys: Vec<String> },

    /// A decode hook rejected the value at this path.
    #[error("error decoding '{path}': {message}")]
    Hook { path: String, message: String },

    #[error(transparent)]
    Aggregate(AggregateError),
}

impl DecodeError {
    pub(crate) fn mismatch(path: &str, expected: &'static str, actual: Kind) -> Self {
        DecodeError::TypeMismatch {
            path: path.to_string(),
            expected,
            actual,
        }
    }

    pub(crate) fn overflow(
        path: &str,
        value: impl std::fmt::Display,
        target: &'static str,
    ) -> Self {
        DecodeError::Overflow {
            path: path.to_string(),
            value: value.to_string(),
            target,
        }
    }

    pub(crate) fn unparsable(path: &str, literal: &str, target: &'static str) -> Self {
        DecodeError::UnparsableLiteral {
            path: path.to_string(),
            target,
            literal: literal.to_string(),
        }
    }
}

/// Every independent failure path of one decode call, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateError {
    pub target: String,
    pub errors: Vec<DecodeError>,
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} error(s) decoding into {}:",
            self.errors.len(),
            self.target
        )?;
        for err in &self.errors {
            write!(f, "\n* {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Ordered collector for soft decode failures.
#[derive(Debug, Default)]
pub struct ErrorBag {
    errors: Vec<DecodeError>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure; nested aggregates are flattened so the top-level
    /// report stays a single flat list.
    pub fn push(&mut self, err: DecodeError) {
        match err {
            DecodeError::Aggregate(agg) => self.errors.extend(agg.errors),
            other => self.errors.push(other),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Folds the collected failures into one aggregate, or `None` when the
    /// decode was clean.
    pub fn into_aggregate(self, target: &str) -> Option<DecodeError> {
        if self.errors.is_empty() {
            return None;
        }
        tracing::debug!(
            target_type = target,
            error_count = self.errors.len(),
            "decode finished with errors"
        );
        Some(DecodeError::Aggregate(AggregateError {
            target: target.to_string(),
            errors: self.errors,
        }))
    }
}

/// Path of a named child, dot-joined except at the root.
pub(crate) fn field_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

/// Path of a sequence element.
pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Path of a mapping entry.
pub(crate) fn key_path(parent: &str, key: &impl std::fmt::Display) -> String {
    format!("{parent}[{key}]")
}
