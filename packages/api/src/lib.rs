//! Cypherflow public API
//!
//! Fluent builders over [`cypherflow_client`]: configure a data source once,
//! then run queries as streams of decoded graph records or as one collected
//! result.
//!
//! ```no_run
//! use cypherflow::CypherFlow;
//! use futures::StreamExt;
//!
//! # async fn run() -> cypherflow::Result<()> {
//! let connector = CypherFlow::connect("http://localhost:7474")
//!     .basic_auth("neo4j", "secret")
//!     .build()?;
//!
//! let mut stream = CypherFlow::with_connector(&connector)
//!     .query("MATCH (p:Person) WHERE p.age > $age RETURN p")
//!     .param("age", 30)
//!     .stream()
//!     .await?;
//!
//! while let Some(record) = stream.records.next().await {
//!     println!("{:?}", record?.nodes);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod builder;

pub use builder::{CypherFlowBuilder, QueryBuilder};

pub use cypherflow_client::{
    AbortHandle, ConnectorConfig, CypherConnector, Edge, Error, GraphRecord, Node, Parameters,
    QueryResult, QueryStream, RecordStream, Result,
};

/// Main entry point providing static builder methods
pub struct CypherFlow;

impl CypherFlow {
    /// Start configuring a connector for the server at `url`
    ///
    /// Shorthand for `CypherFlowBuilder::new(url)`
    pub fn connect(url: impl Into<String>) -> CypherFlowBuilder {
        CypherFlowBuilder::new(url)
    }

    /// Start building queries against an existing connector
    pub fn with_connector(connector: &CypherConnector) -> QueryBuilder {
        QueryBuilder::new(connector)
    }
}
