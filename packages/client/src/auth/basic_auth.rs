//! Basic authentication utilities

use std::io::Write;

use base64::prelude::BASE64_STANDARD;
use base64::write::EncoderWriter;
use http::{HeaderMap, HeaderValue};

use super::AuthProvider;
use crate::error::{Error, Result};

pub fn basic_auth<U, P>(username: U, password: Option<P>) -> Result<HeaderValue>
where
    U: std::fmt::Display,
    P: std::fmt::Display,
{
    let mut buf = b"Basic ".to_vec();
    {
        let mut encoder = EncoderWriter::new(&mut buf, &BASE64_STANDARD);
        let _ = write!(encoder, "{username}:");
        if let Some(password) = password {
            let _ = write!(encoder, "{password}");
        }
    }
    let mut header = HeaderValue::from_bytes(&buf)
        .map_err(|e| crate::error::invalid_header(format!("Invalid authorization header: {e}")))?;
    header.set_sensitive(true);
    Ok(header)
}

/// Basic authentication provider
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: Option<String>,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl AuthProvider for BasicAuth {
    fn apply_auth(&self, headers: &mut HeaderMap) -> std::result::Result<(), Error> {
        let auth_value = basic_auth(&self.username, self.password.as_ref())?;
        headers.insert(http::header::AUTHORIZATION, auth_value);
        Ok(())
    }

    fn auth_type(&self) -> &'static str {
        "Basic"
    }
}
