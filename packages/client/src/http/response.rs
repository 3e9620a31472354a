//! HTTP response with a lazily consumed body

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use serde::de::DeserializeOwned;

use super::body::BodyStream;
use crate::error::{Error, Result};
use crate::telemetry::ClientStats;

/// Largest error body kept when turning an unexpected status into an error
const MAX_ERROR_BODY: usize = 64 * 1024;

/// Response whose head has arrived and whose body is still on the wire
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: url::Url,
    body: Incoming,
    stats: Arc<ClientStats>,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    pub(crate) fn new(
        status: StatusCode,
        headers: HeaderMap,
        url: url::Url,
        body: Incoming,
        stats: Arc<ClientStats>,
    ) -> Self {
        Self {
            status,
            headers,
            url,
            body,
            stats,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// The `Location` header resolved against the request URL
    ///
    /// Returns `Ok(None)` when the header is absent or empty.
    pub fn location(&self) -> Result<Option<url::Url>> {
        let Some(value) = self.headers.get(http::header::LOCATION) else {
            return Ok(None);
        };
        let value = value
            .to_str()
            .map_err(|e| crate::error::protocol(format!("Invalid Location header: {e}")))?
            .trim();
        if value.is_empty() {
            return Ok(None);
        }
        self.url
            .join(value)
            .map(Some)
            .map_err(|e| crate::error::protocol(format!("Invalid Location header `{value}`: {e}")))
    }

    /// Keep the response if its status is one of `accepted`
    ///
    /// Otherwise the body (up to 64 KiB) is read and attached to the returned
    /// status error.
    pub async fn expect_status(self, accepted: &[StatusCode]) -> Result<Self> {
        if accepted.contains(&self.status) {
            return Ok(self);
        }
        Err(self.into_status_error().await)
    }

    pub(crate) async fn into_status_error(self) -> Error {
        let status = self.status;
        let url = self.url.clone();
        let error = crate::error::status_code(url, status);
        match Limited::new(self.body, MAX_ERROR_BODY).collect().await {
            Ok(collected) => {
                let text = String::from_utf8_lossy(&collected.to_bytes()).trim().to_string();
                if text.is_empty() {
                    error
                } else {
                    error.with(text)
                }
            }
            Err(_) => error,
        }
    }

    /// Read the whole body
    pub async fn bytes(self) -> Result<Bytes> {
        let url = self.url;
        let collected = self
            .body
            .collect()
            .await
            .map_err(|e| crate::error::body(e).with_url(url))?;
        let bytes = collected.to_bytes();
        self.stats.record_bytes_received(bytes.len() as u64);
        Ok(bytes)
    }

    /// Read the whole body and deserialize it as JSON
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let url = self.url.clone();
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| crate::error::decode(e).with_url(url))
    }

    /// Consume the response into a stream of body chunks
    #[must_use]
    pub fn into_body_stream(self) -> BodyStream {
        BodyStream::new(self.body, self.url, self.stats)
    }
}
