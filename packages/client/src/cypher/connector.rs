//! Transactional Cypher-over-HTTP connector

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use http::StatusCode;

use super::limit;
use super::record::GraphRecord;
use super::stream::{self, MatchSource, QueryStream};
use super::transaction::{ReleaseGuard, Transaction};
use super::wire::{
    CommitResponse, Parameters, ROW, ROW_AND_GRAPH, ServerInfo, StatementsRequest,
};
use crate::config::{ConnectorConfig, Validator};
use crate::error::Result;
use crate::http::HttpClient;
use crate::jsonpath::{PathExtractor, PathPattern, extract_stream};
use crate::path_pattern;
use crate::telemetry::ClientStatsSnapshot;

/// Location of result rows in a commit response
#[must_use]
pub fn rows_pattern() -> PathPattern {
    path_pattern!["results", 0, "data", "*"]
}

/// Location of server-reported errors in a commit response
#[must_use]
pub fn errors_pattern() -> PathPattern {
    path_pattern!["errors", "*"]
}

/// Every row of a non-streamed query, decoded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column keys; empty when the query returned no row
    pub columns: Vec<String>,
    pub records: Vec<GraphRecord>,
}

/// Runs queries against one graph data service
///
/// Clones share the connection pool and statistics; concurrent queries each
/// own their transaction and socket.
#[derive(Debug, Clone)]
pub struct CypherConnector {
    config: Arc<ConnectorConfig>,
    client: HttpClient,
}

impl CypherConnector {
    /// Validate `config` and build the HTTP client
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> ClientStatsSnapshot {
        self.client.stats().snapshot()
    }

    /// `<base URL><transaction path><suffix>`
    fn endpoint(&self, write_allowed: bool, suffix: &str) -> Result<url::Url> {
        let base = self.config.base_url(write_allowed)?;
        let joined = format!(
            "{}{}{}",
            base.as_str().trim_end_matches('/'),
            self.config.transaction_path,
            suffix
        );
        url::Url::parse(&joined).map_err(crate::error::invalid_url)
    }

    fn log_slow(&self, started: Instant, query: &str) {
        let Some(threshold) = self.config.slow_query_threshold else {
            return;
        };
        let elapsed = started.elapsed();
        if elapsed > threshold {
            tracing::warn!(
                target: "cypherflow::cypher",
                "[Slow: {}ms] Query (HTTP): {}",
                elapsed.as_millis(),
                query
            );
        }
    }

    /// Check that the server answers and the credentials are accepted
    ///
    /// Returns the server version.
    pub async fn connect(&self) -> Result<String> {
        let base = self.config.base_url(false)?;
        let url = format!("{}/db/data", base.as_str().trim_end_matches('/'));
        let url = url::Url::parse(&url).map_err(crate::error::invalid_url)?;

        let response = self
            .client
            .get(url)
            .await?
            .expect_status(&[StatusCode::OK, StatusCode::UNAUTHORIZED])
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(crate::error::auth(
                "Please check the username and password in the configuration.",
            ));
        }

        let info: ServerInfo = response.json().await?;
        let version = info
            .neo4j_version
            .filter(|version| !version.is_empty())
            .ok_or_else(|| crate::error::protocol("Cannot get server version."))?;
        tracing::info!(target: "cypherflow::cypher", %version, "connected");
        Ok(version)
    }

    /// Column keys of `query`, learned by running it with `LIMIT 0`
    ///
    /// A server error is reported with the caller's own limit in place of
    /// the injected one.
    pub async fn query_keys(
        &self,
        query: &str,
        parameters: Option<&Parameters>,
        write_allowed: bool,
    ) -> Result<Vec<String>> {
        let rewrite = limit::enforce_limit(query, 0)?;
        let url = self.endpoint(write_allowed, "/commit")?;
        let body = StatementsRequest::single(&rewrite.query, parameters, ROW);

        let response = self
            .client
            .post_json(url, &body)
            .await?
            .expect_status(&[StatusCode::OK])
            .await?;
        let parsed: CommitResponse = response.json().await?;

        if let Some(error) = parsed.errors.first() {
            let message = limit::restore_limit(&error.to_string(), rewrite.original_limit)?;
            tracing::debug!(target: "cypherflow::cypher", code = %error.code, "pre-flight query rejected");
            return Err(crate::error::query(format!(
                "The server was unable to execute the query: {message}"
            )));
        }

        parsed
            .results
            .into_iter()
            .next()
            .map(|result| result.columns)
            .ok_or_else(|| crate::error::protocol("Pre-flight response has no results."))
    }

    /// Open a transaction with an empty statement list
    ///
    /// The transaction URL comes from the `Location` header; a response
    /// without one fails.
    pub async fn begin_transaction(&self, write_allowed: bool) -> Result<Arc<Transaction>> {
        let url = self.endpoint(write_allowed, "")?;
        let response = self
            .client
            .post_json(url, &StatementsRequest::empty())
            .await?
            .expect_status(&[StatusCode::CREATED])
            .await?;

        let location = response.location()?;
        if let Err(e) = response.bytes().await {
            tracing::debug!(target: "cypherflow::cypher", error = %e, "transaction body not read");
        }

        let Some(url) = location else {
            return Err(crate::error::protocol("Failed to start transaction."));
        };

        let transaction = Transaction::new(url, self.client.clone())?;
        self.client.stats().record_transaction_opened();
        tracing::debug!(target: "cypherflow::cypher", url = %transaction.url(), "transaction opened");
        Ok(Arc::new(transaction))
    }

    /// Run `query` and get its records as a stream
    ///
    /// In order: the column keys are discovered with a `LIMIT 0` pre-flight,
    /// a transaction is opened, and the query is posted to the transaction's
    /// commit URL. The body is read up to the first record (or server error,
    /// or end) before returning, so a query the server rejects fails here
    /// rather than as an empty stream. Any failure after the transaction was
    /// opened rolls it back, including the future being dropped before it
    /// completes.
    pub async fn stream_query(
        &self,
        query: &str,
        parameters: Option<&Parameters>,
        write_allowed: bool,
    ) -> Result<QueryStream> {
        let started = Instant::now();
        let columns = self.query_keys(query, parameters, write_allowed).await?;
        let transaction = self.begin_transaction(write_allowed).await?;
        let guard = ReleaseGuard::new(transaction.clone());

        let (first, source) = match self.prime(&transaction, query, parameters).await {
            Ok(primed) => primed,
            Err(error) => {
                transaction.rollback().await;
                self.log_slow(started, query);
                return Err(error);
            }
        };
        self.log_slow(started, query);

        Ok(stream::spawn(
            columns,
            first,
            source,
            guard.disarm(),
            self.client.stats().clone(),
        ))
    }

    /// Post the query and read until the first row
    async fn prime(
        &self,
        transaction: &Transaction,
        query: &str,
        parameters: Option<&Parameters>,
    ) -> Result<(Option<GraphRecord>, Option<MatchSource>)> {
        let body = StatementsRequest::single(query, parameters, ROW_AND_GRAPH);
        let response = self
            .client
            .post_json(transaction.commit_url().clone(), &body)
            .await?
            .expect_status(&[StatusCode::OK])
            .await?;

        let extractor = PathExtractor::with_patterns(vec![rows_pattern(), errors_pattern()])
            .max_text_length(self.config.max_text_length);
        let mut source: MatchSource = Box::pin(extract_stream(response.into_body_stream(), extractor));

        match source.next().await {
            Some(Ok(found)) => {
                let record = stream::classify(found)?;
                Ok((Some(record), Some(source)))
            }
            Some(Err(error)) => Err(error.into()),
            None => {
                transaction.mark_committed();
                Ok((None, None))
            }
        }
    }

    /// Run `query` against the commit endpoint and decode every row
    pub async fn query(
        &self,
        query: &str,
        parameters: Option<&Parameters>,
        write_allowed: bool,
    ) -> Result<QueryResult> {
        let started = Instant::now();
        let result = self.query_inner(query, parameters, write_allowed).await;
        self.log_slow(started, query);
        result
    }

    async fn query_inner(
        &self,
        query: &str,
        parameters: Option<&Parameters>,
        write_allowed: bool,
    ) -> Result<QueryResult> {
        let url = self.endpoint(write_allowed, "/commit")?;
        let body = StatementsRequest::single(query, parameters, ROW_AND_GRAPH);
        let response = self
            .client
            .post_json(url, &body)
            .await?
            .expect_status(&[StatusCode::OK])
            .await?;
        let parsed: CommitResponse = response.json().await?;

        if let Some(error) = parsed.errors.first() {
            return Err(crate::error::query(format!(
                "The server was unable to execute the query: {error}"
            )));
        }

        let Some(result) = parsed.results.into_iter().next() else {
            return Ok(QueryResult::default());
        };
        if result.data.is_empty() {
            return Ok(QueryResult::default());
        }

        let records: Vec<GraphRecord> = result.data.into_iter().map(GraphRecord::from_wire).collect();
        Ok(QueryResult {
            columns: result.columns,
            records,
        })
    }
}
