//! Condition node predicate evaluation.
//!
//! Evaluation never fails: a missing field, an unknown operator, or values
//! that cannot be compared all evaluate to `false`. Workflows authored in
//! the visual editor routinely carry half-filled condition nodes, and a
//! branch that reads `false` is more useful than a run that aborts.

use serde_json::Value;

use crate::model::ConditionNodeData;
use crate::template::render_value;

/// Evaluate a condition node against its merged input.
pub fn evaluate(data: &ConditionNodeData, input: &Value) -> bool {
    let Some(field) = data.field.as_deref() else {
        return false;
    };
    let Some(operator) = data.operator.as_deref() else {
        return false;
    };
    let Some(actual) = input.get(field) else {
        return false;
    };
    let null = Value::Null;
    let expected = data.value.as_ref().unwrap_or(&null);

    match operator {
        "equals" => values_equal(actual, expected),
        "not_equals" => !values_equal(actual, expected),
        "contains" => contains(actual, expected),
        "greater_than" => compare_numeric(actual, expected, |a, b| a > b),
        "less_than" => compare_numeric(actual, expected, |a, b| a < b),
        _ => false,
    }
}

/// Equality over rendered values, so `1` and `"1"` compare equal. Condition
/// values typed into the editor arrive as strings even when the field they
/// test is numeric.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    render_value(actual) == render_value(expected)
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::String(text) => text.contains(&render_value(expected)),
        Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
        _ => false,
    }
}

/// Numeric comparison with coercion; non-coercible operands make the
/// whole comparison `false`.
fn compare_numeric(actual: &Value, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (value_to_f64(actual), value_to_f64(expected)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn condition(field: &str, operator: &str, value: Value) -> ConditionNodeData {
        ConditionNodeData {
            label: String::new(),
            field: Some(field.into()),
            operator: Some(operator.into()),
            value: Some(value),
        }
    }

    #[test]
    fn equals_matches_same_value() {
        let data = condition("status", "equals", json!("open"));
        assert!(evaluate(&data, &json!({ "status": "open" })));
        assert!(!evaluate(&data, &json!({ "status": "closed" })));
    }

    #[test]
    fn equals_coerces_numbers_and_strings() {
        let data = condition("count", "equals", json!("3"));
        assert!(evaluate(&data, &json!({ "count": 3 })));
    }

    #[test]
    fn not_equals_inverts() {
        let data = condition("status", "not_equals", json!("open"));
        assert!(!evaluate(&data, &json!({ "status": "open" })));
        assert!(evaluate(&data, &json!({ "status": "closed" })));
    }

    #[test]
    fn contains_checks_substrings_and_array_elements() {
        let text = condition("message", "contains", json!("refund"));
        assert!(evaluate(&text, &json!({ "message": "please refund me" })));
        assert!(!evaluate(&text, &json!({ "message": "hello" })));

        let array = condition("tags", "contains", json!("urgent"));
        assert!(evaluate(&array, &json!({ "tags": ["spam", "urgent"] })));
        assert!(!evaluate(&array, &json!({ "tags": ["spam"] })));
    }

    #[test]
    fn greater_than_compares_numerically() {
        let data = condition("score", "greater_than", json!(10));
        assert!(evaluate(&data, &json!({ "score": 11 })));
        assert!(!evaluate(&data, &json!({ "score": 10 })));
        assert!(evaluate(&data, &json!({ "score": "42" })));
    }

    #[test]
    fn greater_than_on_non_numeric_is_false() {
        let data = condition("score", "greater_than", json!(10));
        assert!(!evaluate(&data, &json!({ "score": "not a number" })));
        assert!(!evaluate(&data, &json!({ "score": { "deep": 1 } })));
    }

    #[test]
    fn less_than_compares_numerically() {
        let data = condition("score", "less_than", json!("10"));
        assert!(evaluate(&data, &json!({ "score": 9.5 })));
        assert!(!evaluate(&data, &json!({ "score": 10 })));
    }

    #[test]
    fn missing_field_is_false() {
        let data = condition("absent", "equals", json!("x"));
        assert!(!evaluate(&data, &json!({ "other": "x" })));
    }

    #[test]
    fn unknown_operator_is_false() {
        let data = condition("status", "matches_regex", json!("x"));
        assert!(!evaluate(&data, &json!({ "status": "x" })));
    }

    #[test]
    fn unset_parts_are_false() {
        let empty = ConditionNodeData::default();
        assert!(!evaluate(&empty, &json!({ "anything": 1 })));
    }
}
