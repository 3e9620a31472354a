//! Pooled HTTP/1.1 client used for every request to the data service

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use http::{HeaderName, HeaderValue, Method, Request};
use http_body_util::Full;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use super::response::HttpResponse;
use crate::auth::{AuthProvider, BasicAuth};
use crate::config::ConnectorConfig;
use crate::error::Result;
use crate::telemetry::ClientStats;

/// Asks the server to stream results instead of buffering them
const X_STREAM: &str = "x-stream";

/// HTTP client with connection pooling and request counters
///
/// Cloning is cheap; clones share the connection pool and the statistics.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client<HttpConnector, Full<Bytes>>,
    timeout: Duration,
    user_agent: HeaderValue,
    auth: Option<BasicAuth>,
    stats: Arc<ClientStats>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Build a client from connector settings
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.connect_timeout));
        connector.set_nodelay(true);

        let inner = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build(connector);

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| crate::error::invalid_header(format!("Invalid user agent: {e}")))?;

        let auth = config
            .user
            .as_ref()
            .map(|user| BasicAuth::new(user.clone(), config.password.clone()));

        Ok(Self {
            inner,
            timeout: config.timeout,
            user_agent,
            auth,
            stats: Arc::new(ClientStats::new()),
        })
    }

    #[must_use]
    pub fn stats(&self) -> &Arc<ClientStats> {
        &self.stats
    }

    pub async fn get(&self, url: url::Url) -> Result<HttpResponse> {
        self.send(Method::GET, url, None).await
    }

    /// POST `body` serialized as JSON
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: url::Url,
        body: &T,
    ) -> Result<HttpResponse> {
        let payload = serde_json::to_vec(body).map_err(crate::error::builder)?;
        self.send(Method::POST, url, Some(Bytes::from(payload))).await
    }

    pub async fn delete(&self, url: url::Url) -> Result<HttpResponse> {
        self.send(Method::DELETE, url, None).await
    }

    /// Send one request and wait for the response head
    ///
    /// Only the head is bounded by the configured timeout; the body of the
    /// returned response can be streamed for as long as the server sends it.
    pub async fn send(
        &self,
        method: Method,
        url: url::Url,
        body: Option<Bytes>,
    ) -> Result<HttpResponse> {
        let has_body = body.is_some();
        let body = body.unwrap_or_default();
        let body_len = body.len();

        let mut request = Request::builder()
            .method(method.clone())
            .uri(url.as_str())
            .body(Full::new(body))
            .map_err(|e| crate::error::builder(e).with_url(url.clone()))?;

        let headers = request.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json; charset=UTF-8"));
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(HeaderName::from_static(X_STREAM), HeaderValue::from_static("true"));
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(auth) = &self.auth {
            auth.apply_auth(headers)?;
        }

        self.stats.record_request(body_len);
        tracing::debug!(target: "cypherflow::http", %method, url = %url, body_len, "sending request");

        let response = match tokio::time::timeout(self.timeout, self.inner.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                self.stats.record_failure();
                tracing::debug!(target: "cypherflow::http", %method, url = %url, error = %e, "request failed");
                return Err(crate::error::request(e).with_url(url));
            }
            Err(_elapsed) => {
                self.stats.record_failure();
                tracing::warn!(
                    target: "cypherflow::http",
                    %method,
                    url = %url,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "request timed out"
                );
                return Err(crate::error::timeout(url));
            }
        };

        let (parts, body) = response.into_parts();
        if parts.status.is_success() {
            self.stats.record_success();
        } else {
            self.stats.record_failure();
        }
        tracing::debug!(target: "cypherflow::http", %method, url = %url, status = %parts.status, "response head received");

        Ok(HttpResponse::new(
            parts.status,
            parts.headers,
            url,
            body,
            self.stats.clone(),
        ))
    }
}
