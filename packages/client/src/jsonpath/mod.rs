//! Incremental path-driven JSON extraction
//!
//! This module turns a JSON document arriving in arbitrary chunks into the
//! sequence of subtrees whose location matches a positional [`PathPattern`],
//! without ever materializing the parts of the document nobody asked for.
//!
//! # Architecture
//!
//! - `tokenizer`: byte-level SAX tokenizer, resumable at any chunk boundary
//! - `state_machine`: frame stack computing `matches`/`retain` per container
//! - `extractor`: push API (`write`/`end`) with a queue of finished matches
//! - `stream`: pull-based `Stream` adapter over a byte stream
//!
//! # Examples
//!
//! ```rust
//! use cypherflow_client::jsonpath::PathExtractor;
//! use cypherflow_client::path_pattern;
//!
//! let mut extractor = PathExtractor::new(path_pattern!["foo", 0, "bar", "*", "baz"]);
//! extractor.write_str(r#"{"foo": [{"bar": [{"baz": {"a": 1}}, "#)?;
//! extractor.write_str(r#"{"baz": {"a": 2}}]}]}"#)?;
//! extractor.end()?;
//!
//! let found: Vec<_> = extractor.drain().map(|m| m.value["a"].clone()).collect();
//! assert_eq!(found, vec![1, 2]);
//! # Ok::<(), cypherflow_client::jsonpath::JsonPathError>(())
//! ```

pub mod error;
pub mod extractor;
pub mod pattern;
pub mod state_machine;
pub mod stats;
pub mod stream;
pub mod tokenizer;

pub use self::{
    error::{ErrorKind, JsonPathError, JsonPathResult},
    extractor::{PathExtractor, extract_all},
    pattern::{FrameKey, PathPattern, PathSegment, WILDCARD},
    state_machine::ExtractedMatch,
    stats::ExtractorStats,
    stream::{ExtractStream, extract_stream},
    tokenizer::{DEFAULT_MAX_TEXT_LENGTH, JsonEvent, JsonTokenizer},
};
