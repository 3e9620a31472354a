//! Incremental JSON tokenizer
//!
//! Push-based, byte-level tokenizer that turns arbitrary chunks of a JSON
//! document into SAX-style [`JsonEvent`]s. Chunk boundaries may fall anywhere:
//! inside strings, escape sequences, multi-byte UTF-8 characters, numbers or
//! the `true`/`false`/`null` literals.

mod core;
mod numbers;
mod strings;

use serde_json::Value;

pub use self::core::{DEFAULT_MAX_TEXT_LENGTH, JsonTokenizer};

/// SAX-style event reported by [`JsonTokenizer`]
#[derive(Debug, Clone, PartialEq)]
pub enum JsonEvent {
    /// A string, number, boolean or null
    Value(Value),
    /// `{`
    OpenObject,
    /// Field name inside the innermost open object
    Key(String),
    /// `}`
    CloseObject,
    /// `[`
    OpenArray,
    /// `]`
    CloseArray,
}
