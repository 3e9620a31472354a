//! Configuration validation
//!
//! Common validation helpers shared by every configuration type.

use std::time::Duration;

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration conflict: {0}")]
    Conflict(String),
}

/// Configuration validation trait
pub trait Validator {
    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` variant if any validation fails.
    fn validate(&self) -> ConfigResult<()>;
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate timeout duration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTimeout` if the duration is zero
    /// or exceeds one day.
    pub fn validate_timeout(timeout: Duration, name: &str) -> ConfigResult<()> {
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot be zero"
            )));
        }

        if timeout.as_secs() > 86_400 {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot exceed 1 day"
            )));
        }

        Ok(())
    }

    /// Validate that `url` parses as a plain `http` URL with a host
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidUrl` when the URL does not parse,
    /// has no host, or uses any other scheme (TLS is not wired in).
    pub fn validate_url(url: &str, name: &str) -> ConfigResult<url::Url> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ConfigurationError::InvalidUrl(format!("{name} `{url}`: {e}")))?;

        match parsed.scheme() {
            "http" => {}
            other => {
                return Err(ConfigurationError::InvalidUrl(format!(
                    "{name} has unsupported scheme `{other}`"
                )));
            }
        }

        if parsed.host_str().is_none() {
            return Err(ConfigurationError::InvalidUrl(format!(
                "{name} `{url}` has no host"
            )));
        }

        Ok(parsed)
    }

    /// Validate numeric range
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` if the value is outside
    /// the specified range [min, max] (inclusive).
    pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> ConfigResult<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be between {min} and {max}, got {value}"
            )));
        }

        Ok(())
    }
}
