//! `LIMIT` clause rewriting for pre-flight queries

use regex::{NoExpand, Regex};

use crate::error::Result;

/// A query with its `LIMIT` forced, plus the limit it had before
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitRewrite {
    pub query: String,
    pub original_limit: Option<u64>,
}

fn pattern(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(crate::error::builder)
}

/// Cap the number of rows `query` can return at `limit`
///
/// The query is trimmed and loses its trailing `;`. An existing `LIMIT n`
/// (outside string literals) is lowered to `limit` when higher; without one,
/// ` LIMIT <limit>` is appended.
///
/// # Errors
///
/// A `LIMIT` whose value is not a canonical non-negative integer (e.g. `007`)
/// is rejected as a query error.
pub fn enforce_limit(query: &str, limit: u64) -> Result<LimitRewrite> {
    let mut rewritten = query.trim().trim_end_matches(';').to_string();
    let statements = strip_literals(&rewritten);

    let detect = pattern(r"(?i)\sLIMIT\s+(\d+)")?;
    let Some(text) = detect
        .captures(&statements)
        .and_then(|captures| captures.get(1))
        .map(|found| found.as_str().to_string())
    else {
        rewritten.push_str(&format!(" LIMIT {limit}"));
        return Ok(LimitRewrite {
            query: rewritten,
            original_limit: None,
        });
    };

    let original = match text.parse::<u64>() {
        Ok(value) if value.to_string() == text => value,
        _ => {
            return Err(crate::error::query(format!(
                "The Cypher query LIMIT value \"{text}\" is invalid."
            )));
        }
    };

    if original > limit {
        let replacement = format!(" LIMIT {limit}");
        let clauses: Vec<_> = pattern(r"(?i)\sLIMIT\s+\d+")?
            .find_iter(&statements)
            .map(|clause| clause.range())
            .collect();
        // offsets line up: literals are blanked byte for byte
        for range in clauses.into_iter().rev() {
            rewritten.replace_range(range, &replacement);
        }
    }

    Ok(LimitRewrite {
        query: rewritten,
        original_limit: Some(original),
    })
}

/// Put the caller's limit back into a server message about a `LIMIT 0` query
///
/// Every ` LIMIT 0` becomes ` LIMIT <original>`, or disappears when the
/// query had no limit of its own.
pub fn restore_limit(message: &str, original_limit: Option<u64>) -> Result<String> {
    let replacement = match original_limit {
        Some(limit) => format!(" LIMIT {limit}"),
        None => String::new(),
    };
    Ok(pattern(r"(?i)\sLIMIT 0")?
        .replace_all(message, NoExpand(&replacement))
        .into_owned())
}

/// Blank out the contents of quoted string literals
///
/// Every byte inside a literal becomes a space, so byte offsets into the
/// result are valid in `query`. Quotes are kept. Backslash escapes are
/// honored; an unterminated literal runs to the end.
fn strip_literals(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in query.chars() {
        match quote {
            None => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                }
                out.push(c);
            }
            Some(open) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == open {
                    quote = None;
                    out.push(c);
                    continue;
                }
                out.extend(std::iter::repeat(' ').take(c.len_utf8()));
            }
        }
    }
    out
}
