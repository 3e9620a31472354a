//! Consumer side of a streamed query: records, abort handle and body pump
//!
//! After the first record has been read by `stream_query`, the rest of the
//! response body is driven by a spawned pump task. The pump does not touch
//! the socket until the consumer first polls the [`RecordStream`], and it
//! hands records over through a channel of capacity one, so the connection is
//! read only as fast as records are drained.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, ready};

use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};

use super::record::GraphRecord;
use super::transaction::Transaction;
use super::wire::ServerError;
use crate::error::{Error, Result};
use crate::http::BodyStream;
use crate::jsonpath::{ExtractStream, ExtractedMatch};
use crate::telemetry::ClientStats;

/// Index of the `results[0].data[*]` pattern
pub(crate) const ROWS: usize = 0;
/// Index of the `errors[*]` pattern
pub(crate) const ERRORS: usize = 1;

pub(crate) type MatchSource = Pin<Box<ExtractStream<BodyStream>>>;

/// Result of [`CypherConnector::stream_query`](super::CypherConnector::stream_query)
#[derive(Debug)]
pub struct QueryStream {
    /// Column keys, in the order of every record's `rows`
    pub columns: Vec<String>,
    pub records: RecordStream,
    pub abort: AbortHandle,
}

impl QueryStream {
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, RecordStream, AbortHandle) {
        (self.columns, self.records, self.abort)
    }
}

#[derive(Debug)]
struct Shared {
    aborted: AtomicBool,
    transaction: Option<Arc<Transaction>>,
    pump: Option<tokio::task::AbortHandle>,
}

/// Cancels a streamed query from any task
///
/// Cloning is cheap and every clone controls the same query.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    shared: Arc<Shared>,
}

impl AbortHandle {
    /// Drop the connection and release the transaction
    ///
    /// Idempotent. The socket is closed first, discarding buffered bytes;
    /// then, if the transaction was neither committed nor rolled back yet, it
    /// is deleted on the server. After a natural completion this sends
    /// nothing. Rollback failures are logged, never returned.
    pub async fn abort(&self) {
        let first = !self.shared.aborted.swap(true, Ordering::AcqRel);
        if let Some(pump) = &self.shared.pump {
            pump.abort();
        }
        let rolled_back = match &self.shared.transaction {
            Some(transaction) => transaction.rollback().await,
            None => false,
        };
        if first {
            tracing::debug!(target: "cypherflow::cypher", rolled_back, "query stream aborted");
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.shared.aborted.load(Ordering::Acquire)
    }
}

/// Decoded records in server order, ending with at most one error
///
/// Once the query is aborted the stream ends, even if records were already
/// buffered. Dropping it before the end rolls the transaction back.
pub struct RecordStream {
    first: Option<GraphRecord>,
    rx: Option<mpsc::Receiver<Result<GraphRecord>>>,
    start: Option<oneshot::Sender<()>>,
    shared: Arc<Shared>,
    stats: Arc<ClientStats>,
}

impl std::fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStream")
            .field("primed", &self.first.is_some())
            .field("finished", &self.rx.is_none())
            .field("aborted", &self.shared.aborted.load(Ordering::Relaxed))
            .finish()
    }
}

impl Stream for RecordStream {
    type Item = Result<GraphRecord>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.shared.aborted.load(Ordering::Acquire) {
            this.first = None;
            this.rx = None;
            this.start = None;
            return Poll::Ready(None);
        }

        if let Some(start) = this.start.take() {
            let _ = start.send(());
        }

        if let Some(record) = this.first.take() {
            this.stats.record_record();
            return Poll::Ready(Some(Ok(record)));
        }

        let Some(rx) = this.rx.as_mut() else {
            return Poll::Ready(None);
        };
        match ready!(rx.poll_recv(cx)) {
            Some(item) => {
                if item.is_ok() {
                    this.stats.record_record();
                }
                Poll::Ready(Some(item))
            }
            None => {
                this.rx = None;
                Poll::Ready(None)
            }
        }
    }
}

/// Assemble the consumer-facing stream
///
/// `source` is `None` when the body was already fully read (and the
/// transaction committed) while looking for the first record.
pub(crate) fn spawn(
    columns: Vec<String>,
    first: Option<GraphRecord>,
    source: Option<MatchSource>,
    transaction: Arc<Transaction>,
    stats: Arc<ClientStats>,
) -> QueryStream {
    let (rx, start, pump) = match source {
        Some(source) => {
            let (tx, rx) = mpsc::channel(1);
            let (start_tx, start_rx) = oneshot::channel();
            let handle = tokio::spawn(pump(source, tx, start_rx, transaction.clone()));
            (Some(rx), Some(start_tx), Some(handle.abort_handle()))
        }
        None => (None, None, None),
    };

    let shared = Arc::new(Shared {
        aborted: AtomicBool::new(false),
        transaction: Some(transaction),
        pump,
    });

    QueryStream {
        columns,
        records: RecordStream {
            first,
            rx,
            start,
            shared: shared.clone(),
            stats,
        },
        abort: AbortHandle { shared },
    }
}

/// Turn one extracted match into a record or a terminal error
pub(crate) fn classify(found: ExtractedMatch) -> Result<GraphRecord> {
    match found.pattern {
        ROWS => GraphRecord::decode(found.value),
        _ => Err(server_error(found.value)),
    }
}

pub(crate) fn server_error(value: serde_json::Value) -> Error {
    let error = ServerError::from_value(value);
    crate::error::query(format!("The server was unable to execute the query: {error}"))
}

/// Roll back on a task of its own so aborting the pump cannot cut it short
async fn release(transaction: &Arc<Transaction>) {
    let transaction = transaction.clone();
    if let Err(e) = tokio::spawn(async move { transaction.rollback().await }).await {
        tracing::warn!(target: "cypherflow::cypher", error = %e, "rollback task failed");
    }
}

async fn pump(
    mut source: MatchSource,
    tx: mpsc::Sender<Result<GraphRecord>>,
    start: oneshot::Receiver<()>,
    transaction: Arc<Transaction>,
) {
    if start.await.is_err() {
        tracing::debug!(target: "cypherflow::cypher", "record stream dropped before first poll");
        release(&transaction).await;
        return;
    }

    loop {
        let next = tokio::select! {
            biased;
            () = tx.closed() => {
                tracing::debug!(target: "cypherflow::cypher", "record stream dropped mid-stream");
                release(&transaction).await;
                return;
            }
            next = source.next() => next,
        };

        match next {
            Some(Ok(found)) => match classify(found) {
                Ok(record) => {
                    if tx.send(Ok(record)).await.is_err() {
                        tracing::debug!(target: "cypherflow::cypher", "record stream dropped mid-stream");
                        release(&transaction).await;
                        return;
                    }
                }
                Err(error) => {
                    tracing::warn!(target: "cypherflow::cypher", error = %error, "query failed mid-stream");
                    release(&transaction).await;
                    let _ = tx.send(Err(error)).await;
                    return;
                }
            },
            Some(Err(error)) => {
                let error = Error::from(error);
                tracing::warn!(target: "cypherflow::cypher", error = %error, "response body failed");
                release(&transaction).await;
                let _ = tx.send(Err(error)).await;
                return;
            }
            None => {
                if !transaction.mark_committed() {
                    tracing::debug!(target: "cypherflow::cypher", "body completed after rollback");
                }
                return;
            }
        }
    }
}
