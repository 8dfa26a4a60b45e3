use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use ai::{AssistantRole, CompletionClient};

use crate::model::{NodeData, WorkflowNode};
use crate::template;
use crate::traits::{ExecutionContext, NodeExecutor};
use crate::NodeError;

/// Free-form AI node. Same flow as the assistant executor but without a
/// role preset: the prompt template is the whole instruction, and when none
/// is authored the merged input is sent as-is.
pub struct CustomExecutor {
    client: Arc<dyn CompletionClient>,
}

impl CustomExecutor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeExecutor for CustomExecutor {
    async fn execute(
        &self,
        node: &WorkflowNode,
        input: Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Value, NodeError> {
        let NodeData::Custom(data) = &node.data else {
            return Err(NodeError::Fatal(format!(
                "custom executor dispatched for '{}' node '{}'",
                node.node_type(),
                node.id
            )));
        };

        let prompt = match data.prompt.as_deref() {
            Some(prompt) => template::resolve(prompt, ctx.input, ctx.results),
            None => input.to_string(),
        };

        debug!(node_id = %node.id, prompt_len = prompt.len(), "requesting completion");
        let output = self.client.complete(&prompt, AssistantRole::Custom).await?;

        Ok(json!({
            "nodeId": node.id,
            "type": "custom",
            "role": AssistantRole::Custom.as_str(),
            "input": prompt,
            "output": output,
        }))
    }
}
