//! `db` crate — Postgres persistence for execution state.
//!
//! Provides a connection pool, typed row structs, repository functions for
//! the `executions` and `node_events` tables, and [`PgExecutionStore`], the
//! durable implementation of the engine's `ExecutionStore` seam. No
//! business logic lives here.

pub mod error;
pub mod models;
pub mod pool;
pub mod repository;
pub mod store;

pub use error::DbError;
pub use pool::DbPool;
pub use store::PgExecutionStore;
