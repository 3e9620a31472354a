//! # Cypherflow client
//!
//! Streams Cypher query results from a transactional HTTP endpoint as lazily
//! decoded graph records, without holding the response in memory, and
//! releases the remote transaction on every exit path.
//!
//! ## Features
//!
//! - **Incremental JSON path extraction** over arbitrarily chunked input
//! - **Bounded memory**: unmatched siblings are dropped as soon as they close
//! - **Pull-based backpressure**: the socket is read only as records are drained
//! - **Transactional streaming** with commit-or-rollback exactly once
//! - **Abort from any task** via a cloneable handle
//!
//! ## Usage
//!
//! ```no_run
//! use cypherflow_client::prelude::*;
//! use futures::StreamExt;
//!
//! # async fn run() -> Result<()> {
//! let connector = CypherConnector::new(
//!     ConnectorConfig::new("http://localhost:7474").with_credentials("neo4j", "secret"),
//! )?;
//!
//! let QueryStream { columns, mut records, abort } = connector
//!     .stream_query("MATCH (n:Person) RETURN n.name AS name", None, false)
//!     .await?;
//! println!("columns: {columns:?}");
//!
//! while let Some(record) = records.next().await {
//!     let record = record?;
//!     if record.rows.first().and_then(|v| v.as_str()) == Some("Ada") {
//!         abort.abort().await;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod cypher;
pub mod error;
pub mod http;
pub mod jsonpath;
pub mod prelude;
pub mod telemetry;

pub use config::ConnectorConfig;
pub use cypher::{
    AbortHandle, CypherConnector, Edge, GraphRecord, Node, Parameters, QueryResult, QueryStream,
    RecordStream, Transaction,
};
pub use error::{Error, Result};
pub use self::http::HttpClient;
pub use jsonpath::{JsonPathError, PathExtractor, PathPattern};
pub use telemetry::{ClientStats, ClientStatsSnapshot};
