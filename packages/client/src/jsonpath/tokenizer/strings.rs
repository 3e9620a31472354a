//! String token handling with escape sequences and UTF-16 surrogate pairs

use serde_json::Value;

use super::JsonEvent;
use super::core::{JsonTokenizer, Token};
use crate::jsonpath::error::{JsonPathError, JsonPathResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Backslash,
    Unicode { digits: u8, code: u16 },
}

/// String being read, raw UTF-8 bytes until the closing quote
#[derive(Debug)]
pub(crate) struct StringToken {
    bytes: Vec<u8>,
    is_key: bool,
    escape: Escape,
    /// Leading half of a surrogate pair waiting for its trailing `\uXXXX`
    high_surrogate: Option<u16>,
}

impl StringToken {
    pub(super) fn new(is_key: bool) -> Self {
        Self {
            bytes: Vec::new(),
            is_key,
            escape: Escape::None,
            high_surrogate: None,
        }
    }

    fn push_char(&mut self, c: char) {
        let mut encoded = [0u8; 4];
        self.bytes
            .extend_from_slice(c.encode_utf8(&mut encoded).as_bytes());
    }
}

impl JsonTokenizer {
    pub(super) fn string_byte<F>(&mut self, byte: u8, sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        let offset = self.offset;
        let max = self.max_text_length;
        let Token::Str(token) = &mut self.token else {
            return Ok(());
        };

        match token.escape {
            Escape::None => {
                if token.high_surrogate.is_some() && byte != b'\\' {
                    return Err(lone_surrogate(offset));
                }
                match byte {
                    b'"' => return self.end_string(sink),
                    b'\\' => token.escape = Escape::Backslash,
                    0x00..=0x1f => return Err(JsonPathError::unexpected_byte(byte, offset)),
                    _ => token.bytes.push(byte),
                }
            }
            Escape::Backslash => {
                if token.high_surrogate.is_some() && byte != b'u' {
                    return Err(lone_surrogate(offset));
                }
                token.escape = Escape::None;
                match byte {
                    b'"' | b'\\' | b'/' => token.bytes.push(byte),
                    b'b' => token.bytes.push(0x08),
                    b'f' => token.bytes.push(0x0c),
                    b'n' => token.bytes.push(b'\n'),
                    b'r' => token.bytes.push(b'\r'),
                    b't' => token.bytes.push(b'\t'),
                    b'u' => token.escape = Escape::Unicode { digits: 0, code: 0 },
                    _ => return Err(JsonPathError::unexpected_byte(byte, offset)),
                }
            }
            Escape::Unicode { digits, code } => {
                let value = hex_value(byte).ok_or_else(|| JsonPathError::unexpected_byte(byte, offset))?;
                let code = (code << 4) | value;
                if digits < 3 {
                    token.escape = Escape::Unicode { digits: digits + 1, code };
                } else {
                    token.escape = Escape::None;
                    push_code_unit(token, code, offset)?;
                }
            }
        }

        if token.bytes.len() > max {
            return Err(JsonPathError::token_too_long(max));
        }
        Ok(())
    }

    fn end_string<F>(&mut self, sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        let offset = self.offset;
        let Token::Str(token) = std::mem::replace(&mut self.token, Token::None) else {
            return Ok(());
        };
        if token.high_surrogate.is_some() {
            return Err(lone_surrogate(offset));
        }
        let text = String::from_utf8(token.bytes).map_err(|_| JsonPathError::invalid_utf8(offset))?;
        if token.is_key {
            sink(JsonEvent::Key(text));
            self.after_key();
        } else {
            sink(JsonEvent::Value(Value::String(text)));
            self.after_value();
        }
        Ok(())
    }
}

fn push_code_unit(token: &mut StringToken, code: u16, offset: u64) -> JsonPathResult<()> {
    match (token.high_surrogate.take(), code) {
        (Some(high), 0xDC00..=0xDFFF) => {
            let scalar = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(code) - 0xDC00);
            let c = char::from_u32(scalar).ok_or_else(|| lone_surrogate(offset))?;
            token.push_char(c);
            Ok(())
        }
        (Some(_), _) | (None, 0xDC00..=0xDFFF) => Err(lone_surrogate(offset)),
        (None, 0xD800..=0xDBFF) => {
            token.high_surrogate = Some(code);
            Ok(())
        }
        (None, _) => {
            let c = char::from_u32(u32::from(code)).ok_or_else(|| lone_surrogate(offset))?;
            token.push_char(c);
            Ok(())
        }
    }
}

fn hex_value(byte: u8) -> Option<u16> {
    char::from(byte).to_digit(16).and_then(|d| u16::try_from(d).ok())
}

fn lone_surrogate(offset: u64) -> JsonPathError {
    JsonPathError::invalid_json(format!("Unpaired UTF-16 surrogate in string at offset {offset}"))
}
