//! The execution store seam.
//!
//! The engine persists run state through [`ExecutionStore`] and never
//! talks to a database directly. The `db` crate provides the Postgres
//! implementation; [`MemoryExecutionStore`] backs tests and ad-hoc runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use nodes::model::NodeType;

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Lifecycle states of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states never transition again; stores stamp `finished_at`
    /// when one is written.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown run status: {other}")),
        }
    }
}

/// Lifecycle states of a single node within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRunStatus {
    Started,
    Completed,
    Failed,
    Skipped,
}

impl NodeRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for NodeRunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeRunStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            other => Err(format!("unknown node run status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Error from an execution-store backend.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct StoreError(#[from] anyhow::Error);

// ---------------------------------------------------------------------------
// ExecutionStore
// ---------------------------------------------------------------------------

/// Persistence seam between the engine and whatever stores run state.
///
/// The engine awaits every call before moving on: a returned `Ok` means
/// the write is durable, and the latest `update_run_progress` snapshot is
/// what an operator would resume from. Implementations see one progress
/// write and two events per node, so volume grows linearly with workflow
/// size.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Create a run record in `pending` state and return its ID.
    async fn create_run(&self, input_data: &Value) -> Result<Uuid, StoreError>;

    /// Update run-level status, optionally recording the final output or
    /// the error message that ended the run.
    async fn update_run_status(
        &self,
        execution_id: Uuid,
        status: RunStatus,
        output_data: Option<&Value>,
        error_message: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Record which node the run has reached plus a snapshot of all
    /// results so far.
    async fn update_run_progress(
        &self,
        execution_id: Uuid,
        current_node_id: &str,
        node_results: &Value,
    ) -> Result<(), StoreError>;

    /// Append one per-node lifecycle event.
    async fn log_node_event(
        &self,
        execution_id: Uuid,
        node_id: &str,
        node_type: NodeType,
        status: NodeRunStatus,
        payload: &Value,
        duration_ms: Option<u64>,
    ) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryExecutionStore
// ---------------------------------------------------------------------------

/// A run record held by [`MemoryExecutionStore`].
#[derive(Debug, Clone)]
pub struct MemoryRun {
    pub id: Uuid,
    pub status: RunStatus,
    pub input_data: Value,
    pub output_data: Option<Value>,
    pub error_message: Option<String>,
    pub current_node_id: Option<String>,
    pub node_results: Option<Value>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// A node event recorded by [`MemoryExecutionStore`].
#[derive(Debug, Clone)]
pub struct MemoryNodeEvent {
    pub execution_id: Uuid,
    pub node_id: String,
    pub node_type: NodeType,
    pub status: NodeRunStatus,
    pub payload: Value,
    pub duration_ms: Option<u64>,
}

/// In-memory [`ExecutionStore`] for tests and runs without a database.
/// Tests inspect runs and the event log through the accessor methods.
#[derive(Debug, Default)]
pub struct MemoryExecutionStore {
    runs: Mutex<HashMap<Uuid, MemoryRun>>,
    events: Mutex<Vec<MemoryNodeEvent>>,
}

impl MemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self, execution_id: Uuid) -> Option<MemoryRun> {
        self.runs.lock().unwrap().get(&execution_id).cloned()
    }

    /// All recorded events, in write order.
    pub fn events(&self) -> Vec<MemoryNodeEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, node_id: &str) -> Vec<MemoryNodeEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.node_id == node_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ExecutionStore for MemoryExecutionStore {
    async fn create_run(&self, input_data: &Value) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let run = MemoryRun {
            id,
            status: RunStatus::Pending,
            input_data: input_data.clone(),
            output_data: None,
            error_message: None,
            current_node_id: None,
            node_results: None,
            started_at: Utc::now(),
            finished_at: None,
        };
        self.runs.lock().unwrap().insert(id, run);
        Ok(id)
    }

    async fn update_run_status(
        &self,
        execution_id: Uuid,
        status: RunStatus,
        output_data: Option<&Value>,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut runs = self.runs.lock().unwrap();
        let run = runs
            .get_mut(&execution_id)
            .ok_or_else(|| anyhow::anyhow!("unknown execution: {execution_id}"))?;
        run.status = status;
        if let Some(output) = output_data {
            run.output_data = Some(output.clone());
        }
        if let Some(message) = error_message {
            run.error_message = Some(message.to_owned());
        }
        if status.is_terminal() {
            run.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn update_run_progress(
        &self,
        execution_id: Uuid,
        current_node_id: &str,
        node_results: &Value,
    ) -> Result<(), StoreError> {
        let mut runs = self.runs.lock().unwrap();
        let run = runs
            .get_mut(&execution_id)
            .ok_or_else(|| anyhow::anyhow!("unknown execution: {execution_id}"))?;
        run.current_node_id = Some(current_node_id.to_owned());
        run.node_results = Some(node_results.clone());
        Ok(())
    }

    async fn log_node_event(
        &self,
        execution_id: Uuid,
        node_id: &str,
        node_type: NodeType,
        status: NodeRunStatus,
        payload: &Value,
        duration_ms: Option<u64>,
    ) -> Result<(), StoreError> {
        self.events.lock().unwrap().push(MemoryNodeEvent {
            execution_id,
            node_id: node_id.to_owned(),
            node_type,
            status,
            payload: payload.clone(),
            duration_ms,
        });
        Ok(())
    }
}
