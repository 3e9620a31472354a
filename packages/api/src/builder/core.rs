//! Core `CypherFlowBuilder` structure and connection settings

use std::time::Duration;

use cypherflow_client::{ConnectorConfig, CypherConnector, Result};

/// Fluent builder for a [`CypherConnector`]
///
/// Nothing touches the network until [`build_and_connect`](Self::build_and_connect)
/// or the first query.
#[derive(Debug, Clone)]
pub struct CypherFlowBuilder {
    pub(crate) config: ConnectorConfig,
    pub(crate) debug_enabled: bool,
}

impl CypherFlowBuilder {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            config: ConnectorConfig::new(url),
            debug_enabled: false,
        }
    }

    /// Start from a complete configuration
    #[must_use]
    pub fn from_config(config: ConnectorConfig) -> Self {
        Self {
            config,
            debug_enabled: false,
        }
    }

    /// Log the resulting configuration when building
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Separate server for queries allowed to write
    #[must_use]
    pub fn write_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.with_write_url(url);
        self
    }

    /// Path of the transaction endpoint, `/db/data/transaction` by default
    #[must_use]
    pub fn transaction_path(mut self, path: impl Into<String>) -> Self {
        self.config = self.config.with_transaction_path(path);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_connect_timeout(timeout);
        self
    }

    #[must_use]
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config = self.config.with_pool_max_idle_per_host(max);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.with_user_agent(user_agent);
        self
    }

    /// Log queries slower than `threshold` at warn level
    #[must_use]
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.config = self.config.with_slow_query_threshold(threshold);
        self
    }

    /// Longest string or number accepted in a streamed response
    #[must_use]
    pub fn max_text_length(mut self, max: usize) -> Self {
        self.config = self.config.with_max_text_length(max);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Validate the settings and build the connector
    pub fn build(self) -> Result<CypherConnector> {
        if self.debug_enabled {
            tracing::debug!(
                target: "cypherflow",
                url = %self.config.url,
                write_url = ?self.config.write_url,
                transaction_path = %self.config.transaction_path,
                authenticated = self.config.user.is_some(),
                "building connector"
            );
        }
        CypherConnector::new(self.config)
    }

    /// Build the connector and check the server answers
    ///
    /// Returns the connector with the server version.
    pub async fn build_and_connect(self) -> Result<(CypherConnector, String)> {
        let connector = self.build()?;
        let version = connector.connect().await?;
        Ok((connector, version))
    }
}
