//! Connector configuration structure, defaults and setters

use std::time::Duration;

use super::validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};
use crate::jsonpath::DEFAULT_MAX_TEXT_LENGTH;

/// Default path of the transaction-creation endpoint
pub const DEFAULT_TRANSACTION_PATH: &str = "/db/data/transaction";

/// Connection settings for one graph data source
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Base URL of the data service, e.g. `http://localhost:7474`
    pub url: String,

    /// Base URL used for queries that may write, when it differs from `url`
    pub write_url: Option<String>,

    pub user: Option<String>,

    pub password: Option<String>,

    /// Path of the transaction-creation endpoint, relative to the base URL
    pub transaction_path: String,

    /// Deadline for receiving response headers
    pub timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,

    /// Queries slower than this are logged at warn level
    pub slow_query_threshold: Option<Duration>,

    /// Upper bound for a single string or number in a streamed body
    pub max_text_length: usize,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7474".to_string(),
            write_url: None,
            user: None,
            password: None,
            transaction_path: DEFAULT_TRANSACTION_PATH.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 5,
            user_agent: concat!("cypherflow/", env!("CARGO_PKG_VERSION")).to_string(),
            slow_query_threshold: None,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

impl ConnectorConfig {
    /// Configuration pointing at `url` with every other field defaulted
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_write_url(mut self, url: impl Into<String>) -> Self {
        self.write_url = Some(url.into());
        self
    }

    /// Send HTTP Basic credentials with every request
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_transaction_path(mut self, path: impl Into<String>) -> Self {
        self.transaction_path = path.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn with_max_text_length(mut self, max: usize) -> Self {
        self.max_text_length = max;
        self
    }

    /// Base URL for a query, honoring `write_url` for writable queries
    pub fn base_url(&self, write_allowed: bool) -> ConfigResult<url::Url> {
        match (&self.write_url, write_allowed) {
            (Some(write_url), true) => ConfigValidator::validate_url(write_url, "write_url"),
            _ => ConfigValidator::validate_url(&self.url, "url"),
        }
    }
}

impl Validator for ConnectorConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_url(&self.url, "url")?;
        if let Some(write_url) = &self.write_url {
            ConfigValidator::validate_url(write_url, "write_url")?;
        }

        if self.user.is_some() != self.password.is_some() {
            return Err(ConfigurationError::Conflict(
                "user and password must be set together".to_string(),
            ));
        }

        if !self.transaction_path.starts_with('/') {
            return Err(ConfigurationError::InvalidParameter(format!(
                "transaction_path must start with '/', got `{}`",
                self.transaction_path
            )));
        }

        ConfigValidator::validate_timeout(self.timeout, "timeout")?;
        ConfigValidator::validate_timeout(self.connect_timeout, "connect_timeout")?;
        ConfigValidator::validate_range(self.pool_max_idle_per_host, 0, 1024, "pool_max_idle_per_host")?;
        ConfigValidator::validate_range(self.max_text_length, 16, 1 << 30, "max_text_length")?;

        if let Some(threshold) = self.slow_query_threshold {
            ConfigValidator::validate_timeout(threshold, "slow_query_threshold")?;
        }

        Ok(())
    }
}
