use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use ai::{AssistantRole, CompletionClient};

use crate::model::{AssistantNodeData, NodeData, WorkflowNode};
use crate::template;
use crate::traits::{ExecutionContext, NodeExecutor};
use crate::NodeError;

/// Role-driven AI node. Resolves the prompt template against the run so
/// far, then asks the completion provider for a reply under the role's
/// system prompt.
pub struct AssistantExecutor {
    client: Arc<dyn CompletionClient>,
}

impl AssistantExecutor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    fn build_prompt(data: &AssistantNodeData, input: &Value, ctx: &ExecutionContext<'_>) -> String {
        match data.prompt.as_deref() {
            Some(prompt) => template::resolve(prompt, ctx.input, ctx.results),
            // No template authored: fall back to the label plus a dump of
            // whatever the parent nodes produced.
            None => format!("{}\n\nInput: {}", data.label, input),
        }
    }
}

#[async_trait]
impl NodeExecutor for AssistantExecutor {
    async fn execute(
        &self,
        node: &WorkflowNode,
        input: Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Value, NodeError> {
        let NodeData::Assistant(data) = &node.data else {
            return Err(NodeError::Fatal(format!(
                "assistant executor dispatched for '{}' node '{}'",
                node.node_type(),
                node.id
            )));
        };

        let role = data
            .assistant_role
            .as_deref()
            .map(AssistantRole::parse)
            .unwrap_or(AssistantRole::General);
        let prompt = Self::build_prompt(data, &input, ctx);

        debug!(node_id = %node.id, role = %role, prompt_len = prompt.len(), "requesting completion");
        let output = self.client.complete(&prompt, role).await?;

        Ok(json!({
            "nodeId": node.id,
            "type": "assistant",
            "role": role.as_str(),
            "input": prompt,
            "output": output,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai::MockCompletionClient;
    use crate::result_map::ResultMap;
    use uuid::Uuid;

    fn assistant_node(prompt: Option<&str>, role: Option<&str>) -> WorkflowNode {
        WorkflowNode::new(
            "draft",
            NodeData::Assistant(AssistantNodeData {
                label: "Draft".into(),
                assistant_role: role.map(Into::into),
                prompt: prompt.map(Into::into),
            }),
        )
    }

    fn ctx_over<'run>(input: &'run Value, results: &'run ResultMap) -> ExecutionContext<'run> {
        ExecutionContext {
            execution_id: Uuid::new_v4(),
            input,
            results,
        }
    }

    #[tokio::test]
    async fn resolves_prompt_template_before_calling_provider() {
        let client = Arc::new(MockCompletionClient::echoing());
        let executor = AssistantExecutor::new(client.clone());

        let input_data = json!({ "topic": "rust" });
        let mut results = ResultMap::seeded(input_data.clone());
        results.insert("research", json!({ "output": "notes on rust" }));
        let ctx = ctx_over(&input_data, &results);

        let node = assistant_node(Some("Write about {{topic}} using {{research.output}}"), Some("writing"));
        let out = executor.execute(&node, json!({}), &ctx).await.unwrap();

        assert_eq!(out["input"], "Write about rust using notes on rust");
        assert_eq!(out["output"], "Write about rust using notes on rust");
        assert_eq!(out["role"], "writing");
        assert_eq!(out["type"], "assistant");
        assert_eq!(out["nodeId"], "draft");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, AssistantRole::Writing);
    }

    #[tokio::test]
    async fn synthesizes_prompt_when_template_absent() {
        let client = Arc::new(MockCompletionClient::echoing());
        let executor = AssistantExecutor::new(client);

        let input_data = json!({});
        let results = ResultMap::seeded(input_data.clone());
        let ctx = ctx_over(&input_data, &results);

        let node = assistant_node(None, None);
        let merged = json!({ "output": "parent text" });
        let out = executor.execute(&node, merged, &ctx).await.unwrap();

        let prompt = out["input"].as_str().unwrap();
        assert!(prompt.starts_with("Draft"));
        assert!(prompt.contains("parent text"));
        assert_eq!(out["role"], "general");
    }

    #[tokio::test]
    async fn unknown_role_falls_back_to_general() {
        let client = Arc::new(MockCompletionClient::replying("ok"));
        let executor = AssistantExecutor::new(client.clone());

        let input_data = json!({});
        let results = ResultMap::seeded(input_data.clone());
        let ctx = ctx_over(&input_data, &results);

        let node = assistant_node(Some("hi"), Some("astrologer"));
        let out = executor.execute(&node, json!({}), &ctx).await.unwrap();

        assert_eq!(out["role"], "general");
        assert_eq!(client.calls()[0].1, AssistantRole::General);
    }

    #[tokio::test]
    async fn provider_failure_maps_to_completion_error() {
        let client = Arc::new(MockCompletionClient::failing("rate limited"));
        let executor = AssistantExecutor::new(client);

        let input_data = json!({});
        let results = ResultMap::seeded(input_data.clone());
        let ctx = ctx_over(&input_data, &results);

        let node = assistant_node(Some("hi"), None);
        let err = executor.execute(&node, json!({}), &ctx).await.unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("AI completion failed:"), "{message}");
        assert!(message.contains("rate limited"), "{message}");
    }
}
