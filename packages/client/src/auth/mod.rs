//! Request authentication

pub mod basic_auth;

use http::HeaderMap;

pub use basic_auth::{BasicAuth, basic_auth};

/// Authentication provider trait for different auth types
pub trait AuthProvider: Send + Sync {
    /// Apply authentication to headers
    fn apply_auth(&self, headers: &mut HeaderMap) -> Result<(), crate::error::Error>;

    /// Get authentication method name
    fn auth_type(&self) -> &'static str;
}
