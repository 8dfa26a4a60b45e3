//! Row structs that map 1-to-1 onto database tables.
//!
//! These are persistence models and carry no domain behaviour. Domain
//! types live in the `engine` and `nodes` crates; statuses are stored
//! as plain text and parsed back with the engine's `FromStr` impls
//! when needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// executions
// ---------------------------------------------------------------------------

/// A persisted run row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExecutionRow {
    pub id: Uuid,
    pub status: String,
    pub input_data: serde_json::Value,
    pub output_data: Option<serde_json::Value>,
    pub error_message: Option<String>,
    /// Last node the run reached; on failure, the node that failed.
    pub current_node_id: Option<String>,
    /// Snapshot of the result map at the last progress write.
    pub node_results: Option<serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// node_events
// ---------------------------------------------------------------------------

/// A persisted per-node lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NodeEventRow {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub node_id: String,
    pub node_type: String,
    pub status: String,
    /// Merged input for `started` events, the node result for `completed`,
    /// the error for `failed`.
    pub payload: serde_json::Value,
    pub duration_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}
