//! Decode configuration and the top-level entry points.

use record_types::Value;

use crate::decode::Decode;
use crate::error::{DecodeError, ErrorBag};
use crate::hook::DecodeHook;
use crate::project::ToValue;

/// Settings for one family of decode calls.
///
/// A `Config` is immutable for the duration of a decode; build it up front,
/// then reuse it across calls. The default matches the common
/// database-client setup: strict typing, `column` tags, best-effort commit.
pub struct Config {
    /// Permissive cross-kind coercion (string↔number, bool↔number,
    /// scalar→sequence lifting, sequence→map merging).
    pub weakly_typed: bool,
    /// Which tag key of a field's tag table names its source key.
    pub tag_name: String,
    /// When a decode aggregates errors, still commit the successfully
    /// decoded parts to the caller's slot. `false` leaves the target
    /// untouched on any error.
    pub partial_on_error: bool,
    hooks: Vec<DecodeHook>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weakly_typed: false,
            tag_name: "column".to_string(),
            partial_on_error: true,
            hooks: Vec::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Config::weakly_typed`].
    pub fn weak(mut self, enabled: bool) -> Self {
        self.weakly_typed = enabled;
        self
    }

    /// Builder form of [`Config::tag_name`].
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tag_name = name.into();
        self
    }

    /// Builder form of [`Config::partial_on_error`].
    pub fn partial(mut self, enabled: bool) -> Self {
        self.partial_on_error = enabled;
        self
    }

    /// Appends a hook to the chain; hooks run in registration order.
    pub fn register_hook(&mut self, hook: DecodeHook) {
        self.hooks.push(hook);
    }

    /// Builder form of [`Config::register_hook`].
    pub fn hook(mut self, hook: DecodeHook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub(crate) fn hooks(&self) -> &[DecodeHook] {
        &self.hooks
    }

    /// Decodes a dynamic value into `target`.
    ///
    /// On success the freshly built value replaces `*target`. On failure
    /// the ordered aggregate of every failing path is returned; with
    /// [`Config::partial_on_error`] set, the parts that did decode are
    /// still committed first. A null source is a no-op success.
    ///
    /// Recursion follows the value's depth on the call stack; there is no
    /// cycle detection because [`Value`] trees are acyclic by construction.
    pub fn decode<T: Decode>(&self, source: &Value, target: &mut T) -> Result<(), DecodeError> {
        let type_name = std::any::type_name::<T>();
        tracing::trace!(
            source_kind = %source.kind(),
            target_type = type_name,
            "decoding value"
        );

        let mut errors = ErrorBag::new();
        let decoded = self.decode_at::<T>("", source, &mut errors);
        match errors.into_aggregate(type_name) {
            None => {
                if let Some(built) = decoded {
                    *target = built;
                }
                Ok(())
            }
            Some(err) => {
                if self.partial_on_error {
                    if let Some(built) = decoded {
                        *target = built;
                    }
                }
                Err(err)
            }
        }
    }

    /// Decodes one typed value into another by projecting the source to a
    /// record first, so name and tag resolution runs through the single
    /// record path.
    pub fn decode_from<S, T>(&self, source: &S, target: &mut T) -> Result<(), DecodeError>
    where
        S: ToValue,
        T: Decode,
    {
        let projected = source.to_value(self);
        self.decode(&projected, target)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("weakly_typed", &self.weakly_typed)
            .field("tag_name", &self.tag_name)
            .field("partial_on_error", &self.partial_on_error)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_database_client_setup() {
        let config = Config::default();
        assert!(!config.weakly_typed);
        assert_eq!(config.tag_name, "column");
        assert!(config.partial_on_error);
    }

    #[test]
    fn scalar_decode_assigns_on_success() {
        let config = Config::default();
        let mut out = 0i64;
        config.decode(&Value::Int(42), &mut out).unwrap();
        assert_eq!(out, 42);
    }

    #[test]
    fn null_source_is_a_noop_success() {
        let config = Config::default();
        let mut out = 7i64;
        config.decode(&Value::Null, &mut out).unwrap();
        assert_eq!(out, 7);
    }

    #[test]
    fn failure_reports_one_aggregate() {
        let config = Config::default();
        let mut out = 0i64;
        let err = config.decode(&Value::Bool(true), &mut out).unwrap_err();
        assert!(err.to_string().starts_with("1 error(s) decoding into"));
        assert_eq!(out, 0);
    }
}
