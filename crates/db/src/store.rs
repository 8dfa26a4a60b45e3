//! `PgExecutionStore` — the durable execution store.
//!
//! Thin adapter between the engine's `ExecutionStore` seam and the
//! repository functions. Statuses are written as their string forms so
//! rows stay readable from psql.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use engine::store::{ExecutionStore, NodeRunStatus, RunStatus, StoreError};
use nodes::model::NodeType;

use crate::repository::executions;
use crate::{DbError, DbPool};

/// Postgres-backed [`ExecutionStore`] over the `executions` and
/// `node_events` tables.
#[derive(Clone)]
pub struct PgExecutionStore {
    pool: DbPool,
}

impl PgExecutionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::from(anyhow::Error::new(err))
    }
}

#[async_trait]
impl ExecutionStore for PgExecutionStore {
    async fn create_run(&self, input_data: &Value) -> Result<Uuid, StoreError> {
        Ok(executions::create_execution(&self.pool, input_data).await?)
    }

    async fn update_run_status(
        &self,
        execution_id: Uuid,
        status: RunStatus,
        output_data: Option<&Value>,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        executions::update_execution_status(
            &self.pool,
            execution_id,
            status.as_str(),
            output_data,
            error_message,
            status.is_terminal(),
        )
        .await?;
        Ok(())
    }

    async fn update_run_progress(
        &self,
        execution_id: Uuid,
        current_node_id: &str,
        node_results: &Value,
    ) -> Result<(), StoreError> {
        executions::update_execution_progress(&self.pool, execution_id, current_node_id, node_results)
            .await?;
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
        executions::insert_node_event(
            &self.pool,
            execution_id,
            node_id,
            node_type.as_str(),
            status.as_str(),
            payload,
            duration_ms.map(|ms| ms as i64),
        )
        .await?;
        Ok(())
    }
}
