use super::types::{Error, Kind};
use crate::jsonpath::JsonPathError;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates an `Error` for a builder error.
pub fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

/// Creates an `Error` for a request error.
pub fn request<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Request).with(e.into())
}

/// Creates an `Error` for a body error.
pub fn body<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Body).with(e.into())
}

/// Creates an `Error` for a decode error.
pub fn decode<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Decode).with(e.into())
}

/// Creates an `Error` for an unexpected HTTP status.
pub fn status_code(url: url::Url, status: http::StatusCode) -> Error {
    Error::new(Kind::Status(status)).with_url(url)
}

pub fn timeout(url: url::Url) -> Error {
    Error::new(Kind::Timeout).with_url(url)
}

/// Creates an `Error` for a transactional protocol violation.
pub fn protocol<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Protocol).with(e.into())
}

/// Creates an `Error` carrying the message the graph server rejected a query with.
pub fn query<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Query).with(e.into())
}

pub fn auth<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Auth).with(e.into())
}

pub fn invalid_header<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

pub fn invalid_url<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

impl From<JsonPathError> for Error {
    fn from(error: JsonPathError) -> Self {
        match error.kind {
            crate::jsonpath::ErrorKind::IoError => body(error),
            _ => decode(error),
        }
    }
}

impl From<crate::config::ConfigurationError> for Error {
    fn from(error: crate::config::ConfigurationError) -> Self {
        builder(error)
    }
}
