use async_trait::async_trait;
use serde_json::Value;

use crate::model::WorkflowNode;
use crate::traits::{ExecutionContext, NodeExecutor};
use crate::NodeError;

/// Entry point of a workflow. Input nodes have no parents, so the merged
/// input is ignored; the run's original input data passes through verbatim
/// and becomes addressable by the node's ID in later templates.
pub struct InputExecutor;

#[async_trait]
impl NodeExecutor for InputExecutor {
    async fn execute(
        &self,
        _node: &WorkflowNode,
        _input: Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Value, NodeError> {
        Ok(ctx.input.clone())
    }
}
