//! Counters for requests, bytes and transaction outcomes

pub mod stats;

pub use stats::{ClientStats, ClientStatsSnapshot};
