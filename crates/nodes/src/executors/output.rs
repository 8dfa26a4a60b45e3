use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::model::{NodeData, WorkflowNode};
use crate::result_map::ResultMap;
use crate::traits::{ExecutionContext, NodeExecutor};
use crate::NodeError;

/// Terminal node. Assembles the run's output by extracting the configured
/// fields from prior node results, or returns the whole result map when no
/// fields are configured.
pub struct OutputExecutor;

/// Scan results in execution order; for each entry check the top level
/// first, then one level down inside an `output` sub-object. Assistant and
/// custom nodes nest their payload under `output`, so `fields: ["summary"]`
/// finds a summary the provider returned without the author spelling out
/// the path.
fn find_field<'map>(results: &'map ResultMap, field: &str) -> Option<&'map Value> {
    for (_, result) in results.iter() {
        if let Some(value) = result.get(field) {
            return Some(value);
        }
        if let Some(value) = result.get("output").and_then(|output| output.get(field)) {
            return Some(value);
        }
    }
    None
}

#[async_trait]
impl NodeExecutor for OutputExecutor {
    async fn execute(
        &self,
        node: &WorkflowNode,
        _input: Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Value, NodeError> {
        let NodeData::Output(data) = &node.data else {
            return Err(NodeError::Fatal(format!(
                "output executor dispatched for '{}' node '{}'",
                node.node_type(),
                node.id
            )));
        };

        if data.fields.is_empty() {
            return Ok(ctx.results.to_value());
        }

        let mut collected = Map::new();
        for field in &data.fields {
            if let Some(value) = find_field(ctx.results, field) {
                collected.insert(field.clone(), value.clone());
            }
        }
        Ok(Value::Object(collected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutputNodeData;
    use serde_json::json;
    use uuid::Uuid;

    fn output_node(fields: &[&str]) -> WorkflowNode {
        WorkflowNode::new(
            "out",
            NodeData::Output(OutputNodeData {
                label: "Result".into(),
                fields: fields.iter().map(|f| f.to_string()).collect(),
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
    async fn extracts_field_from_nested_output_object() {
        let input_data = json!({});
        let mut results = ResultMap::seeded(input_data.clone());
        results.insert("draft", json!({ "output": { "summary": "ok" } }));
        let ctx = ctx_over(&input_data, &results);

        let out = OutputExecutor
            .execute(&output_node(&["summary"]), json!({}), &ctx)
            .await
            .unwrap();
        assert_eq!(out, json!({ "summary": "ok" }));
    }

    #[tokio::test]
    async fn top_level_field_wins_over_nested() {
        let input_data = json!({});
        let mut results = ResultMap::seeded(input_data.clone());
        results.insert("a", json!({ "summary": "top" }));
        results.insert("b", json!({ "output": { "summary": "nested" } }));
        let ctx = ctx_over(&input_data, &results);

        let out = OutputExecutor
            .execute(&output_node(&["summary"]), json!({}), &ctx)
            .await
            .unwrap();
        assert_eq!(out["summary"], "top");
    }

    #[tokio::test]
    async fn earlier_producer_wins() {
        let input_data = json!({});
        let mut results = ResultMap::seeded(input_data.clone());
        results.insert("first", json!({ "verdict": "yes" }));
        results.insert("second", json!({ "verdict": "no" }));
        let ctx = ctx_over(&input_data, &results);

        let out = OutputExecutor
            .execute(&output_node(&["verdict"]), json!({}), &ctx)
            .await
            .unwrap();
        assert_eq!(out["verdict"], "yes");
    }

    #[tokio::test]
    async fn missing_fields_are_omitted() {
        let input_data = json!({});
        let mut results = ResultMap::seeded(input_data.clone());
        results.insert("a", json!({ "present": 1 }));
        let ctx = ctx_over(&input_data, &results);

        let out = OutputExecutor
            .execute(&output_node(&["present", "absent"]), json!({}), &ctx)
            .await
            .unwrap();
        assert_eq!(out, json!({ "present": 1 }));
    }

    #[tokio::test]
    async fn no_fields_returns_whole_result_map() {
        let input_data = json!({ "q": 1 });
        let mut results = ResultMap::seeded(input_data.clone());
        results.insert("n", json!({ "output": "x" }));
        let ctx = ctx_over(&input_data, &results);

        let out = OutputExecutor
            .execute(&output_node(&[]), json!({}), &ctx)
            .await
            .unwrap();
        assert_eq!(out["input"], json!({ "q": 1 }));
        assert_eq!(out["n"]["output"], "x");
    }
}
