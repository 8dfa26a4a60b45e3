//! Run and node-event repository functions.
//!
//! Uses the runtime query API (not the compile-time checked macros) so the
//! workspace builds without a live `DATABASE_URL`.

use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ExecutionRow, NodeEventRow};
use crate::DbError;

// ---------------------------------------------------------------------------
// executions
// ---------------------------------------------------------------------------

/// Create a new run record in `pending` status and return its ID.
pub async fn create_execution(pool: &PgPool, input_data: &Value) -> Result<Uuid, DbError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO executions (id, status, input_data, started_at)
        VALUES ($1, 'pending', $2, $3)
        "#,
    )
    .bind(id)
    .bind(input_data)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(id)
}

/// Update a run's status. `output_data` and `error_message` keep their
/// previous values when `None` is passed; `finished` stamps `finished_at`.
pub async fn update_execution_status(
    pool: &PgPool,
    execution_id: Uuid,
    status: &str,
    output_data: Option<&Value>,
    error_message: Option<&str>,
    finished: bool,
) -> Result<(), DbError> {
    if finished {
        sqlx::query(
            r#"
            UPDATE executions
            SET status = $1,
                output_data = COALESCE($2, output_data),
                error_message = COALESCE($3, error_message),
                finished_at = $4
            WHERE id = $5
            "#,
        )
        .bind(status)
        .bind(output_data)
        .bind(error_message)
        .bind(Utc::now())
        .bind(execution_id)
        .execute(pool)
        .await?;
    } else {
        sqlx::query(
            r#"
            UPDATE executions
            SET status = $1,
                output_data = COALESCE($2, output_data),
                error_message = COALESCE($3, error_message)
            WHERE id = $4
            "#,
        )
        .bind(status)
        .bind(output_data)
        .bind(error_message)
        .bind(execution_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Record the node a run has reached plus the result-map snapshot.
pub async fn update_execution_progress(
    pool: &PgPool,
    execution_id: Uuid,
    current_node_id: &str,
    node_results: &Value,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        UPDATE executions
        SET current_node_id = $1, node_results = $2
        WHERE id = $3
        "#,
    )
    .bind(current_node_id)
    .bind(node_results)
    .bind(execution_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a single run row.
pub async fn get_execution(pool: &PgPool, execution_id: Uuid) -> Result<ExecutionRow, DbError> {
    sqlx::query_as::<_, ExecutionRow>(
        r#"
        SELECT id, status, input_data, output_data, error_message,
               current_node_id, node_results, started_at, finished_at
        FROM executions
        WHERE id = $1
        "#,
    )
    .bind(execution_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

// ---------------------------------------------------------------------------
// node_events
// ---------------------------------------------------------------------------

/// Append one per-node lifecycle event.
pub async fn insert_node_event(
    pool: &PgPool,
    execution_id: Uuid,
    node_id: &str,
    node_type: &str,
    status: &str,
    payload: &Value,
    duration_ms: Option<i64>,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO node_events
            (id, execution_id, node_id, node_type, status, payload, duration_ms, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(execution_id)
    .bind(node_id)
    .bind(node_type)
    .bind(status)
    .bind(payload)
    .bind(duration_ms)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// All events for a run, oldest first.
pub async fn list_node_events(
    pool: &PgPool,
    execution_id: Uuid,
) -> Result<Vec<NodeEventRow>, DbError> {
    let rows = sqlx::query_as::<_, NodeEventRow>(
        r#"
        SELECT id, execution_id, node_id, node_type, status, payload,
               duration_ms, created_at
        FROM node_events
        WHERE execution_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(execution_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
