//! Connector configuration
//!
//! - `core`: [`ConnectorConfig`] with defaults and fluent setters
//! - `validation`: the [`Validator`] trait and shared [`ConfigValidator`] helpers

pub mod core;
pub mod validation;

pub use self::core::{ConnectorConfig, DEFAULT_TRANSACTION_PATH};
pub use validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};
