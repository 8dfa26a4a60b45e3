//! Workflow node model.
//!
//! Nodes arrive as JSON in the authoring shape `{"id", "type", "data"}`,
//! where the contents of `data` depend on `type`. `NodeData` captures that
//! as an adjacently tagged enum so each executor gets the fields it needs
//! without re-parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single step in a workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Unique within the workflow; edges reference it.
    pub id: String,
    #[serde(flatten)]
    pub data: NodeData,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }
}

/// Type-specific node payload.
///
/// Unknown keys inside `data` are ignored on deserialization; the authoring
/// frontend stores presentation state (positions, colors) alongside the
/// fields the engine cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NodeData {
    Input(InputNodeData),
    Assistant(AssistantNodeData),
    Condition(ConditionNodeData),
    Output(OutputNodeData),
    Custom(CustomNodeData),
}

impl NodeData {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::Input(_) => NodeType::Input,
            NodeData::Assistant(_) => NodeType::Assistant,
            NodeData::Condition(_) => NodeType::Condition,
            NodeData::Output(_) => NodeType::Output,
            NodeData::Custom(_) => NodeType::Custom,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NodeData::Input(data) => &data.label,
            NodeData::Assistant(data) => &data.label,
            NodeData::Condition(data) => &data.label,
            NodeData::Output(data) => &data.label,
            NodeData::Custom(data) => &data.label,
        }
    }
}

/// The five built-in node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Input,
    Assistant,
    Condition,
    Output,
    Custom,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Input => "input",
            NodeType::Assistant => "assistant",
            NodeType::Condition => "condition",
            NodeType::Output => "output",
            NodeType::Custom => "custom",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry point node; returns the run's input data verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputNodeData {
    #[serde(default)]
    pub label: String,
}

/// AI assistant node: resolves its prompt template and calls the
/// completion provider under a role-specific system prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantNodeData {
    #[serde(default)]
    pub label: String,
    /// Role preset name; unrecognized values fall back to `general`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_role: Option<String>,
    /// Prompt template. When absent a prompt is synthesized from the
    /// label and the node's merged input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Branch predicate node. The operator stays a raw string so workflows
/// authored against newer frontends still load; unknown operators simply
/// evaluate to false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionNodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Terminal node; assembles the run's output from prior results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputNodeData {
    #[serde(default)]
    pub label: String,
    /// Field names to extract from prior node results. Empty means
    /// return the whole result map.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Free-form AI node without a role preset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomNodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_frontend_node_json() {
        let raw = json!({
            "id": "assistant-1",
            "type": "assistant",
            "data": {
                "label": "Draft reply",
                "assistantRole": "customer_support",
                "prompt": "Reply to: {{input.message}}",
                "position": { "x": 120, "y": 40 }
            }
        });

        let node: WorkflowNode = serde_json::from_value(raw).unwrap();
        assert_eq!(node.id, "assistant-1");
        assert_eq!(node.node_type(), NodeType::Assistant);
        match node.data {
            NodeData::Assistant(data) => {
                assert_eq!(data.label, "Draft reply");
                assert_eq!(data.assistant_role.as_deref(), Some("customer_support"));
                assert_eq!(data.prompt.as_deref(), Some("Reply to: {{input.message}}"));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn condition_keeps_unknown_operator_as_string() {
        let raw = json!({
            "id": "cond-1",
            "type": "condition",
            "data": { "label": "Check", "field": "score", "operator": "matches_regex", "value": 10 }
        });

        let node: WorkflowNode = serde_json::from_value(raw).unwrap();
        match node.data {
            NodeData::Condition(data) => {
                assert_eq!(data.operator.as_deref(), Some("matches_regex"));
                assert_eq!(data.value, Some(json!(10)));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn serializes_back_to_tagged_shape() {
        let node = WorkflowNode::new(
            "out",
            NodeData::Output(OutputNodeData {
                label: "Result".into(),
                fields: vec!["summary".into()],
            }),
        );

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["id"], "out");
        assert_eq!(value["type"], "output");
        assert_eq!(value["data"]["fields"], json!(["summary"]));
    }

    #[test]
    fn missing_optional_fields_default() {
        let raw = json!({ "id": "in", "type": "input", "data": {} });
        let node: WorkflowNode = serde_json::from_value(raw).unwrap();
        assert_eq!(node.data.label(), "");
    }
}
