use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::condition;
use crate::model::{NodeData, WorkflowNode};
use crate::traits::{ExecutionContext, NodeExecutor};
use crate::NodeError;

/// Branch predicate node. Evaluates its field/operator/value triple
/// against the merged input and records the verdict; downstream nodes are
/// not pruned, they read `result` out of this node's output if they care.
pub struct ConditionExecutor;

#[async_trait]
impl NodeExecutor for ConditionExecutor {
    async fn execute(
        &self,
        node: &WorkflowNode,
        input: Value,
        _ctx: &ExecutionContext<'_>,
    ) -> Result<Value, NodeError> {
        let NodeData::Condition(data) = &node.data else {
            return Err(NodeError::Fatal(format!(
                "condition executor dispatched for '{}' node '{}'",
                node.node_type(),
                node.id
            )));
        };

        let result = condition::evaluate(data, &input);
        debug!(node_id = %node.id, result, "condition evaluated");

        Ok(json!({
            "nodeId": node.id,
            "type": "condition",
            "result": result,
            "field": data.field,
            "operator": data.operator,
            "value": data.value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConditionNodeData;
    use crate::result_map::ResultMap;
    use uuid::Uuid;

    fn condition_node(field: &str, operator: &str, value: Value) -> WorkflowNode {
        WorkflowNode::new(
            "gate",
            NodeData::Condition(ConditionNodeData {
                label: "Gate".into(),
                field: Some(field.into()),
                operator: Some(operator.into()),
                value: Some(value),
            }),
        )
    }

    #[tokio::test]
    async fn records_verdict_and_echoes_the_predicate() {
        let input_data = json!({});
        let results = ResultMap::seeded(input_data.clone());
        let ctx = ExecutionContext {
            execution_id: Uuid::new_v4(),
            input: &input_data,
            results: &results,
        };

        let node = condition_node("score", "greater_than", json!(10));
        let out = ConditionExecutor
            .execute(&node, json!({ "score": 25 }), &ctx)
            .await
            .unwrap();

        assert_eq!(out["result"], true);
        assert_eq!(out["field"], "score");
        assert_eq!(out["operator"], "greater_than");
        assert_eq!(out["value"], 10);
        assert_eq!(out["type"], "condition");

        let out = ConditionExecutor
            .execute(&node, json!({ "score": 3 }), &ctx)
            .await
            .unwrap();
        assert_eq!(out["result"], false);
    }
}
