//! Dynamic value model for the record decoder.
//!
//! Sources handed to the decoder are represented as [`Value`] trees:
//! scalars, byte strings, sequences, generic mappings, and ordered named
//! [`Record`]s as produced from database rows. [`Kind`] is the closed
//! classification both sides of a decode share.

pub mod kind;
pub mod record;
pub mod value;

pub use kind::Kind;
pub use record::Record;
pub use value::Value;
