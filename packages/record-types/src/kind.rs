//! Structural classification shared by sources and targets.

use serde::{Deserialize, Serialize};

/// Closed set of structural kinds a decode participant can have.
///
/// Source values report their kind through [`crate::Value::kind`]; target
/// types declare theirs statically. The decoder dispatches on target kind
/// and uses the pair for hook selection and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    /// Accepts any value unchanged.
    Any,
    /// Optional target; one level is unwrapped per decode step.
    Pointer,
    /// Named-field target or record source.
    Struct,
    Map,
    Seq,
    Array,
    /// Callable target; no dynamic value can satisfy it.
    Func,
}

impl Kind {
    /// Short lowercase name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Any => "any",
            Kind::Pointer => "pointer",
            Kind::Struct => "struct",
            Kind::Map => "map",
            Kind::Seq => "seq",
            Kind::Array => "array",
            Kind::Func => "func",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
