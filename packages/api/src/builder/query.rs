//! Query construction and execution

use cypherflow_client::{CypherConnector, Parameters, QueryResult, QueryStream, Result};
use serde_json::Value;

/// One query with its parameters, ready to run
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    connector: CypherConnector,
    query: String,
    parameters: Parameters,
    write_allowed: bool,
}

impl QueryBuilder {
    #[must_use]
    pub fn new(connector: &CypherConnector) -> Self {
        Self {
            connector: connector.clone(),
            query: String::new(),
            parameters: Parameters::new(),
            write_allowed: false,
        }
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Bind `$name` to `value`
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Bind every entry of `parameters`, replacing earlier bindings with the same name
    #[must_use]
    pub fn params(mut self, parameters: Parameters) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Run against the write server, if one is configured
    #[must_use]
    pub fn allow_write(mut self, write_allowed: bool) -> Self {
        self.write_allowed = write_allowed;
        self
    }

    fn parameters(&self) -> Option<&Parameters> {
        if self.parameters.is_empty() {
            None
        } else {
            Some(&self.parameters)
        }
    }

    /// Stream decoded records; see [`CypherConnector::stream_query`]
    pub async fn stream(self) -> Result<QueryStream> {
        tracing::debug!(target: "cypherflow", query = %self.query, "streaming query");
        self.connector
            .stream_query(&self.query, self.parameters(), self.write_allowed)
            .await
    }

    /// Run without a transaction and collect every record
    pub async fn collect(self) -> Result<QueryResult> {
        tracing::debug!(target: "cypherflow", query = %self.query, "running query");
        self.connector
            .query(&self.query, self.parameters(), self.write_allowed)
            .await
    }

    /// Column keys only
    pub async fn keys(self) -> Result<Vec<String>> {
        self.connector
            .query_keys(&self.query, self.parameters(), self.write_allowed)
            .await
    }
}
