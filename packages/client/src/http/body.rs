//! Frame-by-frame reading of a response body

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::Stream;
use http_body::Body;
use hyper::body::Incoming;
use pin_project_lite::pin_project;

use crate::error::Result;
use crate::telemetry::ClientStats;

pin_project! {
    /// Data frames of a response body, in arrival order
    ///
    /// Trailers and empty frames are skipped. Frames are only read from the
    /// connection when this stream is polled, and dropping the stream drops
    /// the connection with it.
    pub struct BodyStream {
        #[pin]
        body: Incoming,
        url: url::Url,
        stats: Arc<ClientStats>,
        done: bool,
    }
}

impl BodyStream {
    pub(crate) fn new(body: Incoming, url: url::Url, stats: Arc<ClientStats>) -> Self {
        Self {
            body,
            url,
            stats,
            done: false,
        }
    }
}

impl Stream for BodyStream {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if *this.done {
                return Poll::Ready(None);
            }
            match ready!(this.body.as_mut().poll_frame(cx)) {
                Some(Ok(frame)) => {
                    if let Ok(data) = frame.into_data() {
                        if data.is_empty() {
                            continue;
                        }
                        this.stats.record_bytes_received(data.len() as u64);
                        return Poll::Ready(Some(Ok(data)));
                    }
                }
                Some(Err(e)) => {
                    *this.done = true;
                    let error = crate::error::body(e).with_url(this.url.clone());
                    return Poll::Ready(Some(Err(error)));
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}
