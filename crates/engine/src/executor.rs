//! Workflow execution engine.
//!
//! `WorkflowExecutor` is the central coordinator:
//! 1. Validates the DAG and produces the execution order.
//! 2. Iterates through nodes in order, dispatching each via `NodeExecutor`.
//! 3. Feeds every node the merged output of its parents and stores the
//!    result under the node's ID.
//! 4. Persists run status, per-node events, and result snapshots through
//!    the `ExecutionStore` seam.
//! 5. Stops at the first failing node and marks the run failed; there is
//!    no retry and no partial continuation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use ai::CompletionClient;
use nodes::executors::{
    AssistantExecutor, ConditionExecutor, CustomExecutor, InputExecutor, OutputExecutor,
};
use nodes::model::{NodeType, WorkflowNode};
use nodes::result_map::{ResultMap, INPUT_KEY};
use nodes::traits::{ExecutionContext, NodeExecutor};

use crate::dag::execution_order;
use crate::models::{Workflow, WorkflowEdge};
use crate::store::{ExecutionStore, NodeRunStatus, RunStatus};
use crate::EngineError;

// ---------------------------------------------------------------------------
// Node registry
// ---------------------------------------------------------------------------

/// Maps node types to `NodeExecutor` implementations.
pub type NodeRegistry = HashMap<NodeType, Arc<dyn NodeExecutor>>;

/// Build the standard registry covering all five built-in node types.
pub fn default_registry(client: Arc<dyn CompletionClient>) -> NodeRegistry {
    let mut registry: NodeRegistry = HashMap::new();
    registry.insert(NodeType::Input, Arc::new(InputExecutor));
    registry.insert(
        NodeType::Assistant,
        Arc::new(AssistantExecutor::new(client.clone())),
    );
    registry.insert(NodeType::Condition, Arc::new(ConditionExecutor));
    registry.insert(NodeType::Output, Arc::new(OutputExecutor));
    registry.insert(NodeType::Custom, Arc::new(CustomExecutor::new(client)));
    registry
}

// ---------------------------------------------------------------------------
// Outcome of a run
// ---------------------------------------------------------------------------

/// The structured result of one run. `execute` reports every failure
/// through this type instead of returning an error: triggers always get
/// something they can serialize back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub success: bool,
    /// Absent only when the run record itself could not be created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl RunOutcome {
    fn success(execution_id: Uuid, output_data: Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            execution_id: Some(execution_id),
            output_data: Some(output_data),
            error: None,
            duration_ms,
        }
    }

    fn failure(execution_id: Option<Uuid>, error: &EngineError, duration_ms: u64) -> Self {
        Self {
            success: false,
            execution_id,
            output_data: None,
            error: Some(error.to_string()),
            duration_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowExecutor
// ---------------------------------------------------------------------------

/// Sequential run coordinator.
///
/// Holds no per-run state: one executor may serve many concurrent runs,
/// each call to [`WorkflowExecutor::execute`] owning its own result map
/// and writing only its own records.
pub struct WorkflowExecutor {
    store: Arc<dyn ExecutionStore>,
    registry: NodeRegistry,
}

impl WorkflowExecutor {
    pub fn new(store: Arc<dyn ExecutionStore>, registry: NodeRegistry) -> Self {
        Self { store, registry }
    }

    /// Executor wired with the default registry over `client`.
    pub fn with_client(store: Arc<dyn ExecutionStore>, client: Arc<dyn CompletionClient>) -> Self {
        Self::new(store, default_registry(client))
    }

    /// Run the workflow to completion and report the outcome.
    pub async fn execute(&self, workflow: &Workflow, input_data: Value) -> RunOutcome {
        self.execute_with_cancel(workflow, input_data, CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute), checking `cancel` before each node.
    /// A cancelled run keeps every result produced so far and ends in
    /// `cancelled` state rather than `failed`.
    #[instrument(skip_all, fields(nodes = workflow.nodes.len()))]
    pub async fn execute_with_cancel(
        &self,
        workflow: &Workflow,
        input_data: Value,
        cancel: CancellationToken,
    ) -> RunOutcome {
        let started = Instant::now();

        let execution_id = match self.store.create_run(&input_data).await {
            Ok(id) => id,
            Err(store_err) => {
                let err = EngineError::from(store_err);
                error!("failed to create run record: {err}");
                return RunOutcome::failure(None, &err, elapsed_ms(started));
            }
        };

        match self.drive(workflow, input_data, execution_id, &cancel).await {
            Ok(output) => {
                match self
                    .store
                    .update_run_status(execution_id, RunStatus::Completed, Some(&output), None)
                    .await
                {
                    Ok(()) => {
                        info!(execution_id = %execution_id, "run completed");
                        RunOutcome::success(execution_id, output, elapsed_ms(started))
                    }
                    Err(store_err) => {
                        let err = EngineError::from(store_err);
                        error!(execution_id = %execution_id, "run executed but could not be persisted: {err}");
                        self.mark_run(execution_id, RunStatus::Failed, &err).await;
                        RunOutcome::failure(Some(execution_id), &err, elapsed_ms(started))
                    }
                }
            }
            Err(err) => {
                let terminal = match &err {
                    EngineError::Cancelled { .. } => RunStatus::Cancelled,
                    _ => RunStatus::Failed,
                };
                error!(execution_id = %execution_id, "run ended: {err}");
                self.mark_run(execution_id, terminal, &err).await;
                RunOutcome::failure(Some(execution_id), &err, elapsed_ms(started))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal: the actual run loop
    // -----------------------------------------------------------------------

    async fn drive(
        &self,
        workflow: &Workflow,
        input_data: Value,
        execution_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Value, EngineError> {
        self.store
            .update_run_status(execution_id, RunStatus::Running, None, None)
            .await?;

        // Validation happens after the run record exists so invalid
        // workflows leave an inspectable failed run behind.
        let order = execution_order(workflow)?;
        info!(
            execution_id = %execution_id,
            "executing {} nodes in order: {:?}",
            order.len(),
            order
        );

        let node_map: HashMap<&str, &WorkflowNode> = workflow
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n))
            .collect();

        let mut results = ResultMap::seeded(input_data.clone());

        for node_id in &order {
            if cancel.is_cancelled() {
                info!(execution_id = %execution_id, node_id = %node_id, "cancellation requested, stopping run");
                return Err(EngineError::Cancelled {
                    node_id: node_id.clone(),
                });
            }

            let node = node_map[node_id.as_str()];
            let node_type = node.node_type();
            let merged = merged_input(node_id, &workflow.edges, &results);

            self.store
                .log_node_event(
                    execution_id,
                    node_id,
                    node_type,
                    NodeRunStatus::Started,
                    &merged,
                    None,
                )
                .await?;

            let node_started = Instant::now();
            let executed = self
                .dispatch(node, node_type, merged, execution_id, &input_data, &results)
                .await;
            let duration = elapsed_ms(node_started);

            match executed {
                Ok(output) => {
                    self.store
                        .log_node_event(
                            execution_id,
                            node_id,
                            node_type,
                            NodeRunStatus::Completed,
                            &output,
                            Some(duration),
                        )
                        .await?;
                    results.insert(node_id.clone(), output);
                    self.store
                        .update_run_progress(execution_id, node_id, &results.to_value())
                        .await?;
                    info!(execution_id = %execution_id, node_id = %node_id, duration_ms = duration, "node completed");
                }
                Err(err) => {
                    error!(execution_id = %execution_id, node_id = %node_id, "node failed: {err}");
                    let payload = json!({ "error": err.to_string() });
                    if let Err(log_err) = self
                        .store
                        .log_node_event(
                            execution_id,
                            node_id,
                            node_type,
                            NodeRunStatus::Failed,
                            &payload,
                            Some(duration),
                        )
                        .await
                    {
                        warn!(execution_id = %execution_id, "failed to record node failure: {log_err}");
                    }
                    // Leaves current_node_id pointing at the failing node.
                    if let Err(progress_err) = self
                        .store
                        .update_run_progress(execution_id, node_id, &results.to_value())
                        .await
                    {
                        warn!(execution_id = %execution_id, "failed to record final progress: {progress_err}");
                    }
                    return Err(err);
                }
            }
        }

        Ok(final_output(workflow, &results))
    }

    async fn dispatch(
        &self,
        node: &WorkflowNode,
        node_type: NodeType,
        merged: Value,
        execution_id: Uuid,
        input_data: &Value,
        results: &ResultMap,
    ) -> Result<Value, EngineError> {
        let executor = self
            .registry
            .get(&node_type)
            .ok_or_else(|| EngineError::UnknownNodeType {
                node_id: node.id.clone(),
                node_type,
            })?;

        let ctx = ExecutionContext {
            execution_id,
            input: input_data,
            results,
        };

        executor
            .execute(node, merged, &ctx)
            .await
            .map_err(|source| EngineError::NodeFailed {
                node_id: node.id.clone(),
                source,
            })
    }

    async fn mark_run(&self, execution_id: Uuid, status: RunStatus, err: &EngineError) {
        if let Err(store_err) = self
            .store
            .update_run_status(execution_id, status, None, Some(&err.to_string()))
            .await
        {
            warn!(execution_id = %execution_id, "failed to persist terminal run status: {store_err}");
        }
    }
}

// ---------------------------------------------------------------------------
// Input merging and output selection
// ---------------------------------------------------------------------------

/// Compute a node's input from its parents' stored results.
///
/// No parents: the run's reserved input entry. One parent: that parent's
/// result verbatim. Several parents: a shallow merge of the object
/// results in edge order, later parents overwriting earlier keys;
/// non-object results contribute nothing.
pub(crate) fn merged_input(node_id: &str, edges: &[WorkflowEdge], results: &ResultMap) -> Value {
    let parents: Vec<&str> = edges
        .iter()
        .filter(|edge| edge.target == node_id)
        .map(|edge| edge.source.as_str())
        .collect();

    match parents.as_slice() {
        [] => results.get(INPUT_KEY).cloned().unwrap_or(Value::Null),
        [only] => results.get(only).cloned().unwrap_or(Value::Null),
        many => {
            let mut merged = Map::new();
            for parent in many {
                if let Some(Value::Object(fields)) = results.get(parent) {
                    for (key, value) in fields {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(merged)
        }
    }
}

/// The run's final output: the first `output` node's stored result, or the
/// whole result map when the workflow has none.
pub(crate) fn final_output(workflow: &Workflow, results: &ResultMap) -> Value {
    workflow
        .nodes
        .iter()
        .find(|node| node.node_type() == NodeType::Output)
        .and_then(|node| results.get(&node.id))
        .cloned()
        .unwrap_or_else(|| results.to_value())
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
