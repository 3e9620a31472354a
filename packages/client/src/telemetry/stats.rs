//! Client statistics and transaction counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// HTTP and transaction statistics shared by every clone of a connector
#[derive(Debug)]
pub struct ClientStats {
    /// Total number of requests made
    pub requests_total: AtomicU64,
    /// Number of successful requests (2xx status)
    pub requests_successful: AtomicU64,
    /// Number of failed requests (transport error or non-2xx status)
    pub requests_failed: AtomicU64,
    /// Total request body bytes sent
    pub bytes_sent: AtomicU64,
    /// Total response body bytes received
    pub bytes_received: AtomicU64,
    pub transactions_opened: AtomicU64,
    pub transactions_committed: AtomicU64,
    pub transactions_rolled_back: AtomicU64,
    /// Rollbacks the server answered with something other than 200/405
    pub rollback_failures: AtomicU64,
    /// Records handed to consumers
    pub records_streamed: AtomicU64,
    /// Client creation time
    pub created_at: Instant,
}

impl Default for ClientStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            requests_successful: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            transactions_opened: AtomicU64::new(0),
            transactions_committed: AtomicU64::new(0),
            transactions_rolled_back: AtomicU64::new(0),
            rollback_failures: AtomicU64::new(0),
            records_streamed: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }

    pub fn record_request(&self, body_len: usize) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(body_len as u64, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.requests_successful.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bytes_received(&self, bytes: u64) {
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_transaction_opened(&self) {
        self.transactions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commit(&self) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rollback(&self) {
        self.transactions_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rollback_failure(&self) {
        self.rollback_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_record(&self) {
        self.records_streamed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get success ratio
    pub fn success_ratio(&self) -> f64 {
        let total = self.requests_total.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            let successful = self.requests_successful.load(Ordering::Relaxed);
            #[allow(clippy::cast_precision_loss)]
            {
                successful as f64 / total as f64
            }
        }
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Create a snapshot of current statistics
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_successful: self.requests_successful.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            transactions_opened: self.transactions_opened.load(Ordering::Relaxed),
            transactions_committed: self.transactions_committed.load(Ordering::Relaxed),
            transactions_rolled_back: self.transactions_rolled_back.load(Ordering::Relaxed),
            rollback_failures: self.rollback_failures.load(Ordering::Relaxed),
            records_streamed: self.records_streamed.load(Ordering::Relaxed),
            success_ratio: self.success_ratio(),
            age: self.age(),
        }
    }
}

/// Snapshot of client statistics at a point in time
#[derive(Debug, Clone)]
pub struct ClientStatsSnapshot {
    pub requests_total: u64,
    pub requests_successful: u64,
    pub requests_failed: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub transactions_opened: u64,
    pub transactions_committed: u64,
    pub transactions_rolled_back: u64,
    pub rollback_failures: u64,
    pub records_streamed: u64,
    pub success_ratio: f64,
    pub age: Duration,
}

impl ClientStatsSnapshot {
    /// Transactions neither committed nor rolled back yet
    #[must_use]
    pub fn transactions_open(&self) -> u64 {
        self.transactions_opened
            .saturating_sub(self.transactions_committed + self.transactions_rolled_back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let stats = ClientStats::new();
        stats.record_request(10);
        stats.record_success();
        stats.record_request(5);
        stats.record_failure();
        stats.record_transaction_opened();
        stats.record_transaction_opened();
        stats.record_commit();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.bytes_sent, 15);
        assert!((snapshot.success_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.transactions_open(), 1);
    }
}
