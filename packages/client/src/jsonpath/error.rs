//! JSON Path Error Types
//!
//! Error types for path patterns, incremental tokenizing and subtree extraction.

use std::error::Error;
use std::fmt;

/// JSON Path processing error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid JSON syntax reported by the tokenizer
    InvalidJson,
    /// Invalid path pattern
    InvalidPath,
    /// Input ended while a container was still open
    UnexpectedEnd,
    /// A single text token exceeded the configured maximum length
    TokenTooLong,
    /// Error reported by the byte source feeding the extractor
    IoError,
}

/// Main JSON Path error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPathError {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for JsonPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON Path Error: {}", self.message)
    }
}

impl Error for JsonPathError {}

/// Result type for JSON Path operations
pub type JsonPathResult<T> = Result<T, JsonPathError>;

impl JsonPathError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn invalid_json(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidJson, msg.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPath, msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoError, msg.into())
    }

    /// Input ended while a container of the given kind was open
    #[must_use]
    pub fn unexpected_end(open_kind: &str) -> Self {
        Self::new(
            ErrorKind::UnexpectedEnd,
            format!("Unexpected JSON stream end ({open_kind} not closed)"),
        )
    }

    #[must_use]
    pub fn unexpected_byte(byte: u8, offset: u64) -> Self {
        let shown = if byte.is_ascii_graphic() {
            format!("'{}'", byte as char)
        } else {
            format!("0x{byte:02x}")
        };
        Self::new(
            ErrorKind::InvalidJson,
            format!("Unexpected byte {shown} at offset {offset}"),
        )
    }

    #[must_use]
    pub fn invalid_utf8(offset: u64) -> Self {
        Self::new(
            ErrorKind::InvalidJson,
            format!("Invalid UTF-8 sequence in string ending at offset {offset}"),
        )
    }

    #[must_use]
    pub fn invalid_number(text: &str) -> Self {
        Self::new(ErrorKind::InvalidJson, format!("Invalid number format: {text}"))
    }

    #[must_use]
    pub fn token_too_long(limit: usize) -> Self {
        Self::new(
            ErrorKind::TokenTooLong,
            format!("Text token exceeds maximum length of {limit} bytes"),
        )
    }

    /// Whether this error was raised because input stopped early
    #[must_use]
    pub fn is_unexpected_end(&self) -> bool {
        self.kind == ErrorKind::UnexpectedEnd
    }
}
