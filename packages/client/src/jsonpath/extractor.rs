//! Push-based path extractor
//!
//! Wraps the incremental tokenizer and the frame stack. Callers `write`
//! chunks as they arrive, pull finished subtrees with `next_match`, and call
//! `end` once the input is exhausted.

use serde_json::Value;

use super::error::JsonPathResult;
use super::pattern::PathPattern;
use super::state_machine::{ExtractedMatch, FrameStack};
use super::stats::ExtractorStats;
use super::tokenizer::JsonTokenizer;

/// Incremental extractor of the subtrees selected by one or more patterns
///
/// Memory stays bounded by the retained subtree currently being built plus
/// the chain of open, non-retained ancestors.
#[derive(Debug)]
pub struct PathExtractor {
    tokenizer: JsonTokenizer,
    frames: FrameStack,
    ended: bool,
}

impl PathExtractor {
    /// Extractor for a single pattern
    #[must_use]
    pub fn new(pattern: PathPattern) -> Self {
        Self::with_patterns(vec![pattern])
    }

    /// Extractor for several patterns; matches report the index of the pattern they hit
    #[must_use]
    pub fn with_patterns(patterns: Vec<PathPattern>) -> Self {
        Self {
            tokenizer: JsonTokenizer::new(),
            frames: FrameStack::new(patterns),
            ended: false,
        }
    }

    /// Reject string and number tokens longer than `max_text_length` bytes
    #[must_use]
    pub fn max_text_length(mut self, max_text_length: usize) -> Self {
        self.tokenizer = JsonTokenizer::with_max_text_length(max_text_length);
        self
    }

    /// Feed the next chunk of the document
    ///
    /// # Errors
    ///
    /// Returns the tokenizer error on malformed input. Errors are terminal:
    /// later calls to `write` or `end` return the same error. Matches queued
    /// before the error stay available through `next_match`.
    pub fn write(&mut self, chunk: &[u8]) -> JsonPathResult<()> {
        let frames = &mut self.frames;
        let result = self
            .tokenizer
            .feed(chunk, &mut |event| frames.on_event(event));
        match result {
            Ok(()) => {
                self.frames.stats.bytes_written += chunk.len() as u64;
                Ok(())
            }
            Err(error) => {
                log::error!(
                    "JSON extraction failed after {} bytes: {}",
                    self.tokenizer.offset(),
                    error
                );
                Err(error)
            }
        }
    }

    /// Feed text instead of raw bytes
    ///
    /// # Errors
    ///
    /// See [`PathExtractor::write`].
    pub fn write_str(&mut self, chunk: &str) -> JsonPathResult<()> {
        self.write(chunk.as_bytes())
    }

    /// Signal that no more input will arrive
    ///
    /// # Errors
    ///
    /// Returns an `UnexpectedEnd` error naming the innermost unclosed
    /// container if the document is incomplete; the extraction has then
    /// not completed.
    pub fn end(&mut self) -> JsonPathResult<()> {
        let frames = &mut self.frames;
        let result = self.tokenizer.finish(&mut |event| frames.on_event(event));
        if let Err(error) = &result {
            log::warn!(
                "JSON stream ended early at depth {}: {}",
                self.frames.depth(),
                error
            );
            return result;
        }
        self.ended = true;
        log::debug!(
            "JSON extraction complete: {} bytes, {} matches",
            self.frames.stats.bytes_written,
            self.frames.stats.matches_emitted
        );
        Ok(())
    }

    /// Next subtree ready for the consumer, in document order
    pub fn next_match(&mut self) -> Option<ExtractedMatch> {
        self.frames.pop_ready()
    }

    /// Take every subtree ready for the consumer
    pub fn drain(&mut self) -> impl Iterator<Item = ExtractedMatch> + '_ {
        std::iter::from_fn(move || self.frames.pop_ready())
    }

    /// Number of matches waiting to be pulled
    #[must_use]
    pub fn pending(&self) -> usize {
        self.frames.ready_len()
    }

    /// Whether `end` completed successfully
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.ended
    }

    #[must_use]
    pub fn patterns(&self) -> &[PathPattern] {
        self.frames.patterns()
    }

    #[must_use]
    pub fn stats(&self) -> ExtractorStats {
        self.frames.stats
    }
}

/// Extract every subtree selected by `pattern` from a complete document
///
/// # Errors
///
/// Returns the first tokenizer or structural error.
pub fn extract_all(pattern: PathPattern, input: &[u8]) -> JsonPathResult<Vec<Value>> {
    let mut extractor = PathExtractor::new(pattern);
    extractor.write(input)?;
    extractor.end()?;
    Ok(extractor.drain().map(|found| found.value).collect())
}
