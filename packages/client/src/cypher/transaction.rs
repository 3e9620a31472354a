//! Remote transaction handle and its release obligation

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use http::StatusCode;

use crate::error::Result;
use crate::http::HttpClient;

const OPEN: u8 = 0;
const COMMITTED: u8 = 1;
const ROLLED_BACK: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Open,
    Committed,
    RolledBack,
}

/// A transaction opened on the server, identified by its URL
///
/// The state only ever moves from `Open` to exactly one of `Committed` or
/// `RolledBack`. Whoever wins that transition owns the corresponding remote
/// effect, so a commit observed by the body reader and a concurrent abort can
/// never both act.
#[derive(Debug)]
pub struct Transaction {
    url: url::Url,
    commit_url: url::Url,
    state: AtomicU8,
    client: HttpClient,
}

impl Transaction {
    pub(crate) fn new(url: url::Url, client: HttpClient) -> Result<Self> {
        let commit = format!("{}/commit", url.as_str().trim_end_matches('/'));
        let commit_url = url::Url::parse(&commit)
            .map_err(|e| crate::error::protocol(format!("Invalid transaction URL `{url}`: {e}")))?;
        Ok(Self {
            url,
            commit_url,
            state: AtomicU8::new(OPEN),
            client,
        })
    }

    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// `<transaction URL>/commit`, which executes and commits in one request
    #[must_use]
    pub fn commit_url(&self) -> &url::Url {
        &self.commit_url
    }

    #[must_use]
    pub fn state(&self) -> TransactionState {
        match self.state.load(Ordering::Acquire) {
            OPEN => TransactionState::Open,
            COMMITTED => TransactionState::Committed,
            _ => TransactionState::RolledBack,
        }
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(OPEN, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Record that the server committed the transaction
    ///
    /// Returns `false` if a rollback already claimed it.
    pub(crate) fn mark_committed(&self) -> bool {
        let won = self.transition(COMMITTED);
        if won {
            self.client.stats().record_commit();
            tracing::debug!(target: "cypherflow::cypher", url = %self.url, "transaction committed");
        }
        won
    }

    /// Release the transaction with `DELETE <transaction URL>`
    ///
    /// Does nothing and returns `false` if the transaction is no longer open.
    /// `200` and `405` (already expired) both count as released; any other
    /// outcome is logged and otherwise ignored.
    pub async fn rollback(&self) -> bool {
        if !self.transition(ROLLED_BACK) {
            return false;
        }
        let stats = self.client.stats();
        stats.record_rollback();

        match self.client.delete(self.url.clone()).await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::OK || status == StatusCode::METHOD_NOT_ALLOWED {
                    tracing::debug!(target: "cypherflow::cypher", url = %self.url, %status, "transaction rolled back");
                    if let Err(e) = response.bytes().await {
                        tracing::debug!(target: "cypherflow::cypher", error = %e, "rollback body not read");
                    }
                } else {
                    stats.record_rollback_failure();
                    let error = response.into_status_error().await;
                    tracing::warn!(target: "cypherflow::cypher", url = %self.url, error = %error, "failed to delete transaction");
                }
            }
            Err(error) => {
                stats.record_rollback_failure();
                tracing::warn!(target: "cypherflow::cypher", url = %self.url, error = %error, "failed to delete transaction");
            }
        }
        true
    }
}

/// Rolls a transaction back when dropped while still armed
///
/// Covers the window between opening a transaction and handing its stream to
/// the caller: a future cancelled in that window still releases the
/// transaction. The rollback runs on a spawned task since `Drop` cannot wait.
#[derive(Debug)]
pub(crate) struct ReleaseGuard {
    transaction: Arc<Transaction>,
    armed: bool,
}

impl ReleaseGuard {
    pub(crate) fn new(transaction: Arc<Transaction>) -> Self {
        Self {
            transaction,
            armed: true,
        }
    }

    /// Hand the release obligation over to the caller
    pub(crate) fn disarm(mut self) -> Arc<Transaction> {
        self.armed = false;
        self.transaction.clone()
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        if !self.armed || self.transaction.state() != TransactionState::Open {
            return;
        }
        let transaction = self.transaction.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(target: "cypherflow::cypher", url = %transaction.url, "query cancelled before streaming");
                handle.spawn(async move {
                    transaction.rollback().await;
                });
            }
            Err(_) => {
                tracing::warn!(target: "cypherflow::cypher", url = %transaction.url, "no runtime to roll back transaction");
            }
        }
    }
}
