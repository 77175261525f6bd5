//! Type-directed decoding of dynamically shaped records.
//!
//! The decoder takes an untyped [`Value`] tree — a database row, a parsed
//! JSON document, any mapping/sequence of primitives — and builds a
//! statically declared target from it: struct fields, maps, sequences,
//! fixed-size arrays, optionals, scalars. Conversion is type-directed with
//! an optional weak mode for cross-kind coercion, field binding follows
//! configurable tags with a case-insensitive fallback, embedded structs
//! flatten into their parent's namespace, and failures aggregate per path
//! instead of aborting at the first one.
//!
//! ```
//! use record_decode::{Config, Record, Value};
//!
//! #[derive(Debug, Default, PartialEq, record_decode::Record)]
//! struct User {
//!     #[record(tag(column = "login_name"))]
//!     login_name: String,
//!     age: Option<i32>,
//! }
//!
//! let mut row = Record::new();
//! row.push("login_name", Value::String("ann".into()));
//! row.push("age", Value::Int(30));
//!
//! let mut user = User::default();
//! Config::default().decode(&Value::Record(row), &mut user).unwrap();
//! assert_eq!(user.age, Some(30));
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod hook;
pub mod project;

pub use config::Config;
pub use decode::fields::{FieldSpec, RecordTarget};
pub use decode::{Decode, Shape};
pub use error::{AggregateError, DecodeError, ErrorBag};
pub use hook::DecodeHook;
pub use project::ToValue;

pub use record_types::{Kind, Record, Value};

pub use record_decode_derive::Record;
