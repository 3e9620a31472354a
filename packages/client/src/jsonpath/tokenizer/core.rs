//! Tokenizer state and structural byte handling

use super::JsonEvent;
use super::numbers::{LiteralToken, NumberToken};
use super::strings::StringToken;
use crate::jsonpath::error::{JsonPathError, JsonPathResult};

/// Default upper bound for a single string or number token (1 MiB)
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 1024 * 1024;

/// Container currently open in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Container {
    Object,
    Array,
}

impl Container {
    pub(super) fn name(self) -> &'static str {
        match self {
            Container::Object => "object",
            Container::Array => "array",
        }
    }
}

/// What the grammar accepts at the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Nothing read yet
    Root,
    /// A value after `:` or `,` in an array
    Value,
    /// A value or `]` right after `[`
    FirstElement,
    /// A key or `}` right after `{`
    FirstKey,
    /// A key after `,` in an object
    Key,
    Colon,
    CommaOrClose,
    /// Root value complete, only whitespace may follow
    Done,
}

/// Token spanning several bytes, possibly several chunks
#[derive(Debug)]
pub(super) enum Token {
    None,
    Str(StringToken),
    Number(NumberToken),
    Literal(LiteralToken),
}

/// Incremental JSON tokenizer
///
/// Errors are terminal: once a malformed byte is seen the tokenizer keeps
/// returning the same error for every later call.
#[derive(Debug)]
pub struct JsonTokenizer {
    pub(super) containers: Vec<Container>,
    expect: Expect,
    pub(super) token: Token,
    pub(super) offset: u64,
    pub(super) max_text_length: usize,
    failure: Option<JsonPathError>,
}

impl Default for JsonTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonTokenizer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_text_length(DEFAULT_MAX_TEXT_LENGTH)
    }

    /// Create a tokenizer rejecting string/number tokens longer than `max_text_length` bytes
    #[must_use]
    pub fn with_max_text_length(max_text_length: usize) -> Self {
        Self {
            containers: Vec::new(),
            expect: Expect::Root,
            token: Token::None,
            offset: 0,
            max_text_length,
            failure: None,
        }
    }

    /// Number of bytes consumed so far
    #[inline]
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Current container nesting depth
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    /// Error that stopped the tokenizer, if any
    #[must_use]
    pub fn failure(&self) -> Option<&JsonPathError> {
        self.failure.as_ref()
    }

    /// Feed the next chunk of the document
    ///
    /// Events are reported to `sink` in document order as soon as they are
    /// complete; partial tokens are carried over to the next call.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidJson` or `TokenTooLong` error on malformed input.
    pub fn feed<F>(&mut self, chunk: &[u8], sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        for &byte in chunk {
            if let Err(error) = self.step(byte, sink) {
                self.failure = Some(error.clone());
                return Err(error);
            }
            self.offset += 1;
        }
        Ok(())
    }

    /// Signal the end of input
    ///
    /// Flushes a trailing number at the root (`42` has no terminator).
    ///
    /// # Errors
    ///
    /// Returns an `UnexpectedEnd` error naming the innermost open container
    /// (or the unfinished token) when the document is incomplete.
    pub fn finish<F>(&mut self, sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let result = self.finish_inner(sink);
        if let Err(error) = &result {
            self.failure = Some(error.clone());
        }
        result
    }

    fn finish_inner<F>(&mut self, sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        if matches!(self.token, Token::Number(_)) {
            self.end_number(sink)?;
        }
        if let Some(container) = self.containers.last() {
            return Err(JsonPathError::unexpected_end(container.name()));
        }
        match self.token {
            Token::None => Ok(()),
            Token::Str(_) => Err(JsonPathError::unexpected_end("string")),
            Token::Number(_) | Token::Literal(_) => Err(JsonPathError::unexpected_end("literal")),
        }
    }

    fn step<F>(&mut self, byte: u8, sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        match self.token {
            Token::Str(_) => return self.string_byte(byte, sink),
            Token::Literal(_) => return self.literal_byte(byte, sink),
            Token::Number(_) => {
                if self.number_byte(byte)? {
                    return Ok(());
                }
                // the byte terminating a number is structural
                self.end_number(sink)?;
            }
            Token::None => {}
        }
        self.structural(byte, sink)
    }

    fn structural<F>(&mut self, byte: u8, sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        if matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
            return Ok(());
        }

        match self.expect {
            Expect::Root | Expect::Value => self.begin_value(byte, sink),
            Expect::FirstElement => {
                if byte == b']' {
                    self.close(Container::Array, sink);
                    Ok(())
                } else {
                    self.begin_value(byte, sink)
                }
            }
            Expect::FirstKey => match byte {
                b'}' => {
                    self.close(Container::Object, sink);
                    Ok(())
                }
                b'"' => {
                    self.token = Token::Str(StringToken::new(true));
                    Ok(())
                }
                _ => Err(self.unexpected(byte)),
            },
            Expect::Key => match byte {
                b'"' => {
                    self.token = Token::Str(StringToken::new(true));
                    Ok(())
                }
                _ => Err(self.unexpected(byte)),
            },
            Expect::Colon => match byte {
                b':' => {
                    self.expect = Expect::Value;
                    Ok(())
                }
                _ => Err(self.unexpected(byte)),
            },
            Expect::CommaOrClose => match (byte, self.containers.last()) {
                (b',', Some(Container::Object)) => {
                    self.expect = Expect::Key;
                    Ok(())
                }
                (b',', Some(Container::Array)) => {
                    self.expect = Expect::Value;
                    Ok(())
                }
                (b'}', Some(Container::Object)) => {
                    self.close(Container::Object, sink);
                    Ok(())
                }
                (b']', Some(Container::Array)) => {
                    self.close(Container::Array, sink);
                    Ok(())
                }
                _ => Err(self.unexpected(byte)),
            },
            Expect::Done => Err(self.unexpected(byte)),
        }
    }

    fn begin_value<F>(&mut self, byte: u8, sink: &mut F) -> JsonPathResult<()>
    where
        F: FnMut(JsonEvent),
    {
        match byte {
            b'{' => {
                self.containers.push(Container::Object);
                self.expect = Expect::FirstKey;
                sink(JsonEvent::OpenObject);
            }
            b'[' => {
                self.containers.push(Container::Array);
                self.expect = Expect::FirstElement;
                sink(JsonEvent::OpenArray);
            }
            b'"' => self.token = Token::Str(StringToken::new(false)),
            b'-' | b'0'..=b'9' => self.token = Token::Number(NumberToken::new(byte)),
            b't' | b'f' | b'n' => self.token = Token::Literal(LiteralToken::new(byte)),
            _ => return Err(self.unexpected(byte)),
        }
        Ok(())
    }

    fn close<F>(&mut self, container: Container, sink: &mut F)
    where
        F: FnMut(JsonEvent),
    {
        self.containers.pop();
        sink(match container {
            Container::Object => JsonEvent::CloseObject,
            Container::Array => JsonEvent::CloseArray,
        });
        self.after_value();
    }

    /// Update the expectation once a complete value has been read
    pub(super) fn after_value(&mut self) {
        self.expect = if self.containers.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrClose
        };
    }

    /// A key string is complete, its value follows the colon
    pub(super) fn after_key(&mut self) {
        self.expect = Expect::Colon;
    }

    pub(super) fn unexpected(&self, byte: u8) -> JsonPathError {
        JsonPathError::unexpected_byte(byte, self.offset)
    }
}
