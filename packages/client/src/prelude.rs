//! Cypherflow prelude
//!
//! The types most callers need to run and consume queries.

pub use crate::config::ConnectorConfig;
pub use crate::cypher::{
    AbortHandle, CypherConnector, Edge, GraphRecord, Node, Parameters, QueryResult, QueryStream,
    RecordStream,
};
pub use crate::error::{Error, Result};
pub use crate::jsonpath::{ExtractedMatch, PathExtractor, PathPattern, extract_stream};
pub use crate::telemetry::ClientStatsSnapshot;

pub use url::Url;
