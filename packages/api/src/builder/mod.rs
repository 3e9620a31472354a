//! Fluent builders
//!
//! - `core`: [`CypherFlowBuilder`], connection settings and connector construction
//! - `auth`: credentials
//! - `query`: [`QueryBuilder`], parameters and execution

pub mod auth;
pub mod core;
pub mod query;

pub use self::core::CypherFlowBuilder;
pub use query::QueryBuilder;
