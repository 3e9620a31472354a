//! HTTP transport
//!
//! A thin layer over the pooled `hyper-util` client: JSON requests, response
//! heads with status checks, and bodies exposed as a `Stream` of chunks.

pub mod body;
pub mod client;
pub mod response;

pub use body::BodyStream;
pub use client::HttpClient;
pub use response::HttpResponse;
