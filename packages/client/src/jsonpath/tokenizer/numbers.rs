//! Number and literal (`true`, `false`, `null`) tokens
//!
//! Numbers have no terminator of their own: a number ends at the first byte
//! that cannot belong to it, or at the end of input for a root-level number.
//! The collected text is validated by `serde_json` so leading zeros, bare
//! signs and dangling exponents are rejected exactly as a full parse would.

use serde_json::{Number, Value};

use super::JsonEvent;
use super::core::{JsonTokenizer, Token};
use crate::jsonpath::error::{JsonPathError, JsonPathResult};

#[derive(Debug)]
pub(crate) struct NumberToken {
    text: Vec<u8>,
}

impl NumberToken {
    pub(super) fn new(first: u8) -> Self {
        Self { text: vec![first] }
    }
}

#[derive(Debug)]
pub(crate) struct LiteralToken {
    expected: &'static [u8],
    matched: usize,
    value: Value,
}

impl LiteralToken {
    pub(super) fn new(first: u8) -> Self {
        let (expected, value) = match first {
            b't' => (&b"true"[..], Value::Bool(true)),
            b'f' => (&b"false"[..], Value::Bool(false)),
            _ => (&b"null"[..], Value::Null),
        };
        Self { expected, matched: 1, value }
    }
}

impl JsonTokenizer {
    /// Append `byte` to the current number; `Ok(false)` when it ends the number
    pub(super) fn number_byte(&mut self, byte: u8) -> JsonPathResult<bool> {
        let max = self.max_text_length;
        let Token::Number(token) = &mut self.token else {
            return Ok(false);
        };
        if !matches!(byte, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
            return Ok(false);
        }
        token.text.push(byte);
        if token.text.len() > max {
            return Err(JsonPathError::token_too_long(max));
        }
        Ok(true)
    }

    pub(super) fn end_number<F>(&mut self, sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        let Token::Number(token) = std::mem::replace(&mut self.token, Token::None) else {
            return Ok(());
        };
        let number: Number = serde_json::from_slice(&token.text).map_err(|_| {
            JsonPathError::invalid_number(&String::from_utf8_lossy(&token.text))
        })?;
        sink(JsonEvent::Value(Value::Number(number)));
        self.after_value();
        Ok(())
    }

    pub(super) fn literal_byte<F>(&mut self, byte: u8, sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        let offset = self.offset;
        let Token::Literal(token) = &mut self.token else {
            return Ok(());
        };
        if token.expected.get(token.matched) != Some(&byte) {
            return Err(JsonPathError::unexpected_byte(byte, offset));
        }
        token.matched += 1;
        if token.matched == token.expected.len() {
            let value = std::mem::replace(&mut token.value, Value::Null);
            self.token = Token::None;
            sink(JsonEvent::Value(value));
            self.after_value();
        }
        Ok(())
    }
}
