//! Pull-based adapter from a byte stream to a stream of matches
//!
//! The inner byte stream is only polled when no match is waiting, so the
//! transport advances exactly as fast as the consumer drains matches.

use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;
use pin_project_lite::pin_project;

use super::error::{JsonPathError, JsonPathResult};
use super::extractor::PathExtractor;
use super::state_machine::ExtractedMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Reading,
    Finished,
}

pin_project! {
    /// Stream of subtrees extracted from a stream of byte chunks
    ///
    /// Yields matches in document order, then either ends (the document was
    /// complete) or yields one terminal error and ends.
    pub struct ExtractStream<S> {
        #[pin]
        inner: S,
        extractor: PathExtractor,
        phase: Phase,
        failure: Option<JsonPathError>,
    }
}

impl<S> ExtractStream<S> {
    #[must_use]
    pub fn new(inner: S, extractor: PathExtractor) -> Self {
        Self {
            inner,
            extractor,
            phase: Phase::Reading,
            failure: None,
        }
    }

    /// Whether the document was read to its end without error
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.extractor.is_complete()
    }

    #[must_use]
    pub fn extractor(&self) -> &PathExtractor {
        &self.extractor
    }
}

impl<S, B, E> Stream for ExtractStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    type Item = JsonPathResult<ExtractedMatch>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(found) = this.extractor.next_match() {
                return Poll::Ready(Some(Ok(found)));
            }
            if *this.phase == Phase::Finished {
                return Poll::Ready(this.failure.take().map(Err));
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => {
                    if let Err(error) = this.extractor.write(chunk.as_ref()) {
                        *this.phase = Phase::Finished;
                        *this.failure = Some(error);
                    }
                }
                Some(Err(error)) => {
                    *this.phase = Phase::Finished;
                    *this.failure = Some(JsonPathError::io_error(error.to_string()));
                }
                None => {
                    *this.phase = Phase::Finished;
                    if let Err(error) = this.extractor.end() {
                        *this.failure = Some(error);
                    }
                }
            }
        }
    }
}

/// Extract matches of `extractor`'s patterns from a stream of byte chunks
pub fn extract_stream<S>(inner: S, extractor: PathExtractor) -> ExtractStream<S> {
    ExtractStream::new(inner, extractor)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use futures::StreamExt;
    use serde_json::json;

    use super::*;
    use crate::path_pattern;

    #[tokio::test]
    async fn yields_matches_then_ends() {
        let chunks = vec![r#"{"data":[{"a":"#, r#"1},{"a":2}"#, "]}"];
        let source = futures::stream::iter(chunks.into_iter().map(Ok::<_, Infallible>));
        let values: Vec<_> = extract_stream(source, PathExtractor::new(path_pattern!["data", "*"]))
            .map(|item| item.map(|found| found.value))
            .collect()
            .await;
        assert_eq!(values, vec![Ok(json!({"a": 1})), Ok(json!({"a": 2}))]);
    }

    #[tokio::test]
    async fn truncated_source_ends_with_one_error() {
        let source = futures::stream::iter(vec![Ok::<_, Infallible>(r#"{"data":[{"a":1},"#)]);
        let items: Vec<_> =
            extract_stream(source, PathExtractor::new(path_pattern!["data", "*"]))
                .collect()
                .await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        let error = items[1].as_ref().expect_err("truncated");
        assert!(error.is_unexpected_end());
    }

    #[tokio::test]
    async fn source_errors_are_reported() {
        let source = futures::stream::iter(vec![Ok("[1,"), Err("connection reset")]);
        let items: Vec<_> = extract_stream(source, PathExtractor::new(path_pattern!["*"]))
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().map(|found| found.value.clone()), Ok(json!(1)));
        let error = items[1].as_ref().expect_err("source failed");
        assert_eq!(error.kind, crate::jsonpath::ErrorKind::IoError);
    }

    #[tokio::test]
    async fn source_is_not_polled_while_matches_are_queued() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let polled = Arc::new(AtomicUsize::new(0));
        let counter = polled.clone();
        let source = futures::stream::iter(vec![r#"[{"a":1},{"a":2},{"a":3}]"#, ""])
            .inspect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .map(Ok::<_, Infallible>);
        let mut stream = Box::pin(extract_stream(source, PathExtractor::new(path_pattern!["*"])));
        for _ in 0..3 {
            assert!(stream.next().await.is_some());
        }
        assert_eq!(polled.load(Ordering::SeqCst), 1);
        assert!(stream.next().await.is_none());
        assert_eq!(polled.load(Ordering::SeqCst), 2);
    }
}
