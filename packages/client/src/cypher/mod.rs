//! Transactional stream client
//!
//! A query runs in three strictly sequenced steps against the server's
//! transactional endpoint:
//!
//! 1. the column keys are discovered by running the query with `LIMIT 0`
//!    against the commit endpoint (see [`limit`]);
//! 2. a transaction is opened with an empty statement list and located by
//!    the response's `Location` header;
//! 3. the real query is posted to `<transaction>/commit` and its response
//!    body is piped through a [`PathExtractor`](crate::jsonpath::PathExtractor)
//!    matching `["results", 0, "data", "*"]`, each match being decoded into a
//!    [`GraphRecord`].
//!
//! The transaction is released exactly once: committed by the server when
//! the body completes, or deleted on abort, error, or when the consumer drops
//! the record stream.

pub mod connector;
pub mod limit;
pub mod record;
pub mod stream;
pub mod transaction;
pub mod wire;

pub use connector::{CypherConnector, QueryResult, errors_pattern, rows_pattern};
pub use limit::{LimitRewrite, enforce_limit, restore_limit};
pub use record::{Edge, GraphRecord, Node};
pub use stream::{AbortHandle, QueryStream, RecordStream};
pub use transaction::{Transaction, TransactionState};
pub use wire::{Parameters, ServerError};
