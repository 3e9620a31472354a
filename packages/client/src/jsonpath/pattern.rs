//! Positional path patterns
//!
//! A pattern is a fixed-length list of segments compared position by position
//! against the keys of the currently open containers. There is no recursive
//! descent and no backtracking: a subtree matches only when it sits at exactly
//! `pattern.len()` levels below the document root.

use std::fmt;

use serde_json::Value;

use super::error::{JsonPathError, JsonPathResult};

/// Token used for the wildcard segment in the JSON array form of a pattern
pub const WILDCARD: &str = "*";

/// One positional segment of a [`PathPattern`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object field name
    Key(String),
    /// Array position
    Index(usize),
    /// Any key or index
    Wildcard,
}

/// Location of a value inside its parent container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameKey {
    /// Field name inside an object
    Key(String),
    /// Position inside an array
    Index(usize),
}

impl PathSegment {
    /// Whether this segment accepts a value stored under `key`
    ///
    /// Keys and indices never match each other: `"0"` does not select
    /// the first element of an array.
    #[inline]
    #[must_use]
    pub fn accepts(&self, key: &FrameKey) -> bool {
        match (self, key) {
            (PathSegment::Wildcard, _) => true,
            (PathSegment::Key(expected), FrameKey::Key(actual)) => expected == actual,
            (PathSegment::Index(expected), FrameKey::Index(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        if value == WILDCARD {
            PathSegment::Wildcard
        } else {
            PathSegment::Key(value.to_string())
        }
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

/// Ordered list of segments selecting subtrees of a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathPattern {
    segments: Vec<PathSegment>,
}

impl PathPattern {
    /// Build a pattern from explicit segments
    #[must_use]
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Parse the JSON array form of a pattern, e.g. `["results", 0, "data", "*"]`
    ///
    /// # Errors
    ///
    /// Returns an `InvalidPath` error if `value` is not an array, or if an
    /// element is neither a string nor a non-negative integer.
    pub fn from_json(value: &Value) -> JsonPathResult<Self> {
        let Value::Array(items) = value else {
            return Err(JsonPathError::invalid_path(format!(
                "path pattern must be a JSON array, got {value}"
            )));
        };

        let segments = items
            .iter()
            .enumerate()
            .map(|(position, item)| match item {
                Value::String(key) => Ok(PathSegment::from(key.as_str())),
                Value::Number(number) => number
                    .as_u64()
                    .and_then(|index| usize::try_from(index).ok())
                    .map(PathSegment::Index)
                    .ok_or_else(|| {
                        JsonPathError::invalid_path(format!(
                            "segment {position} must be a non-negative integer index, got {number}"
                        ))
                    }),
                other => Err(JsonPathError::invalid_path(format!(
                    "segment {position} must be a string or an index, got {other}"
                ))),
            })
            .collect::<JsonPathResult<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the pattern selects the document root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Compare the pattern against the keys leading from the root to a value
    ///
    /// `keys` lists, outermost first, the key of every container below the
    /// root down to and including the candidate value itself.
    #[must_use]
    pub fn matches_keys<'a, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a FrameKey>,
    {
        let mut keys = keys.into_iter();
        for segment in &self.segments {
            match keys.next() {
                Some(key) if segment.accepts(key) => {}
                _ => return false,
            }
        }
        keys.next().is_none()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match segment {
                PathSegment::Key(key) => write!(f, "{}", Value::String(key.clone()))?,
                PathSegment::Index(index) => write!(f, "{index}")?,
                PathSegment::Wildcard => write!(f, "\"{WILDCARD}\"")?,
            }
        }
        f.write_str("]")
    }
}

/// Build a [`PathPattern`] from a list of keys, indices and `"*"`
///
/// ```
/// use cypherflow_client::path_pattern;
///
/// let pattern = path_pattern!["results", 0, "data", "*"];
/// assert_eq!(pattern.len(), 4);
/// ```
#[macro_export]
macro_rules! path_pattern {
    ($($segment:expr),* $(,)?) => {
        $crate::jsonpath::PathPattern::new(vec![
            $($crate::jsonpath::PathSegment::from($segment)),*
        ])
    };
}
