//! The `NodeExecutor` trait — the contract every node type must fulfil.

use async_trait::async_trait;
use serde_json::Value;

use crate::model::WorkflowNode;
use crate::result_map::ResultMap;
use crate::NodeError;

/// Read-only view of the run, passed to every executor.
///
/// Defined here (in the nodes crate) so both the engine and individual
/// executor implementations can import it without a circular dependency.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'run> {
    /// ID of the current execution run.
    pub execution_id: uuid::Uuid,
    /// Initial input supplied when the run was triggered.
    pub input: &'run Value,
    /// Results of every node executed so far, keyed by node ID, plus the
    /// reserved `input` entry.
    pub results: &'run ResultMap,
}

/// The core executor trait, one implementation per node type.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Execute `node`, receiving the merged output of its parent nodes as
    /// `input`, and return this node's JSON result.
    async fn execute(
        &self,
        node: &WorkflowNode,
        input: Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Value, NodeError>;
}
