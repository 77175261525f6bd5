//! The decode pipeline: trait, target shapes, and per-node dispatch.
//!
//! Every node of a decode runs the same pipeline the top-level call does:
//! null short-circuit, then the hook chain, then kind dispatch into the
//! target's [`Decode`] implementation. Paths accumulate dotted/indexed
//! segments so failures deep in a tree name their exact location.

pub mod fields;
pub mod map;
pub mod scalar;
pub mod seq;
pub mod time;

use std::any::TypeId;

use record_types::{Kind, Value};

use crate::config::Config;
use crate::error::{DecodeError, ErrorBag};

/// Static description of a decode target, used for hook dispatch.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub kind: Kind,
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl Shape {
    pub fn of<T: Decode>() -> Self {
        Shape {
            kind: T::KIND,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// True when the target is exactly `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// A type that can be built from a dynamic [`Value`].
///
/// Implementations classify themselves with a static [`Kind`]; an
/// unsupported target is therefore a missing impl, caught at compile time.
/// `decode_value` returns the built value, or `None` after recording the
/// failure in the bag — siblings keep decoding either way.
pub trait Decode: Sized + 'static {
    const KIND: Kind;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self>;
}

impl Config {
    /// Runs the full decode pipeline for one node.
    ///
    /// A null source leaves the target at its current value and records
    /// nothing, so absent and `NULL` columns behave identically. Hooks run
    /// next, in registration order; a hook failure aborts this path only.
    pub fn decode_at<T: Decode>(
        &self,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<T> {
        if value.is_null() {
            return None;
        }
        let shape = Shape::of::<T>();
        match self.run_hooks(value, &shape) {
            Ok(None) => T::decode_value(self, path, value, errors),
            Ok(Some(rewritten)) => T::decode_value(self, path, &rewritten, errors),
            Err(err) => {
                errors.push(DecodeError::Hook {
                    path: path.to_string(),
                    message: format!("{err:#}"),
                });
                None
            }
        }
    }
}

/// Any-targets accept every non-null value unchanged.
impl Decode for Value {
    const KIND: Kind = Kind::Any;

    fn decode_value(_: &Config, _: &str, value: &Value, _: &mut ErrorBag) -> Option<Self> {
        Some(value.clone())
    }
}

/// Optional targets unwrap one level per decode step. The null case never
/// reaches this impl (the pipeline short-circuits it), so a present value
/// decodes as the pointee and re-wraps.
impl<T: Decode> Decode for Option<T> {
    const KIND: Kind = Kind::Pointer;

    fn decode_value(
        config: &Config,
        path: &str,
        value: &Value,
        errors: &mut ErrorBag,
    ) -> Option<Self> {
        config.decode_at::<T>(path, value, errors).map(Some)
    }
}
