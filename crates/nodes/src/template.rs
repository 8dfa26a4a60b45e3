//! Prompt template resolution.
//!
//! Templates support two constructs, resolved in two passes:
//!
//! 1. `{{variable}}` and `{{node.path}}` substitution. A dotted reference
//!    names a prior node's result and walks the remaining path through it;
//!    a plain name is looked up in the run's input data. Unresolvable
//!    references are left in place so a prompt never loses information
//!    silently.
//! 2. `{{#if cond}}...{{/if}}` blocks. The condition is looked up the same
//!    way and tested for truthiness; truthy blocks are replaced by their
//!    recursively resolved content, falsy blocks disappear.

use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;

use crate::result_map::ResultMap;

/// Raised by [`resolve_strict`] when a reference cannot be resolved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unresolved template reference: {0}")]
    UnresolvedReference(String),
}

/// Resolve a template against the run's input data and prior node results.
///
/// Lenient: unresolvable `{{...}}` references stay in the output verbatim.
pub fn resolve(template: &str, input_data: &Value, results: &ResultMap) -> String {
    let substituted = substitute_variables(template, input_data, results);
    resolve_conditionals(&substituted, input_data, results)
}

/// Like [`resolve`], but fails on the first reference that stays
/// unresolved after both passes.
pub fn resolve_strict(
    template: &str,
    input_data: &Value,
    results: &ResultMap,
) -> Result<String, TemplateError> {
    let resolved = resolve(template, input_data, results);
    let variable = Regex::new(r"\{\{([^#/}][^}]*)\}\}").unwrap();
    if let Some(caps) = variable.captures(&resolved) {
        return Err(TemplateError::UnresolvedReference(
            caps[1].trim().to_string(),
        ));
    }
    Ok(resolved)
}

fn substitute_variables(template: &str, input_data: &Value, results: &ResultMap) -> String {
    // First capture char excludes '#' and '/' so block markers survive
    // this pass untouched.
    let variable = Regex::new(r"\{\{([^#/}][^}]*)\}\}").unwrap();
    variable
        .replace_all(template, |caps: &Captures<'_>| {
            let reference = caps[1].trim();
            match lookup(reference, input_data, results) {
                Some(value) => render_value(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn resolve_conditionals(template: &str, input_data: &Value, results: &ResultMap) -> String {
    let block = Regex::new(r"(?s)\{\{#if\s+([^}]+)\}\}(.*?)\{\{/if\}\}").unwrap();
    block
        .replace_all(template, |caps: &Captures<'_>| {
            let condition = caps[1].trim();
            if is_truthy(lookup(condition, input_data, results)) {
                resolve(&caps[2], input_data, results)
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Look up a reference. `node.path.to.field` walks a prior result;
/// a bare name reads the input data.
fn lookup<'a>(reference: &str, input_data: &'a Value, results: &'a ResultMap) -> Option<&'a Value> {
    match reference.split_once('.') {
        Some((node_id, path)) => {
            let mut current = results.get(node_id)?;
            for segment in path.split('.') {
                current = step(current, segment)?;
            }
            Some(current)
        }
        None => input_data.get(reference),
    }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    value.get(segment).or_else(|| {
        // Numeric segments index into arrays.
        segment.parse::<usize>().ok().and_then(|index| value.get(index))
    })
}

/// Strings render bare; everything else renders as compact JSON.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// JavaScript-style truthiness over JSON values.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results_with(entries: &[(&str, Value)]) -> ResultMap {
        let mut map = ResultMap::new();
        for (id, value) in entries {
            map.insert(*id, value.clone());
        }
        map
    }

    #[test]
    fn substitutes_input_variables_and_node_paths() {
        let results = results_with(&[("b", json!({ "c": "y" }))]);
        let out = resolve("{{a}} and {{b.c}}", &json!({ "a": "x" }), &results);
        assert_eq!(out, "x and y");
    }

    #[test]
    fn walks_nested_paths() {
        let results = results_with(&[("draft", json!({ "output": { "title": "Hello" } }))]);
        let out = resolve("Title: {{draft.output.title}}", &json!({}), &results);
        assert_eq!(out, "Title: Hello");
    }

    #[test]
    fn indexes_arrays_with_numeric_segments() {
        let results = results_with(&[("list", json!({ "items": ["first", "second"] }))]);
        let out = resolve("{{list.items.1}}", &json!({}), &results);
        assert_eq!(out, "second");
    }

    #[test]
    fn unresolved_references_stay_verbatim() {
        let out = resolve("keep {{missing}} and {{ghost.path}}", &json!({}), &ResultMap::new());
        assert_eq!(out, "keep {{missing}} and {{ghost.path}}");
    }

    #[test]
    fn trims_whitespace_inside_braces() {
        let out = resolve("{{ name }}", &json!({ "name": "Ada" }), &ResultMap::new());
        assert_eq!(out, "Ada");
    }

    #[test]
    fn non_string_values_render_as_json() {
        let input = json!({ "count": 3, "flag": true, "meta": { "k": 1 } });
        let out = resolve("{{count}}/{{flag}}/{{meta}}", &input, &ResultMap::new());
        assert_eq!(out, "3/true/{\"k\":1}");
    }

    #[test]
    fn truthy_conditional_keeps_resolved_content() {
        let input = json!({ "premium": true, "name": "Ada" });
        let out = resolve("{{#if premium}}VIP: {{name}}{{/if}}", &input, &ResultMap::new());
        assert_eq!(out, "VIP: Ada");
    }

    #[test]
    fn falsy_conditional_removes_block() {
        for input in [
            json!({ "premium": false }),
            json!({ "premium": 0 }),
            json!({ "premium": "" }),
            json!({ "premium": null }),
            json!({}),
        ] {
            let out = resolve("a{{#if premium}}X{{/if}}b", &input, &ResultMap::new());
            assert_eq!(out, "ab", "input: {input}");
        }
    }

    #[test]
    fn conditional_condition_may_be_a_node_path() {
        let results = results_with(&[("check", json!({ "result": true }))]);
        let out = resolve("{{#if check.result}}passed{{/if}}", &json!({}), &results);
        assert_eq!(out, "passed");
    }

    #[test]
    fn sibling_conditionals_resolve_independently() {
        let input = json!({ "a": true, "b": false });
        let out = resolve("{{#if a}}A{{/if}}-{{#if b}}B{{/if}}", &input, &ResultMap::new());
        assert_eq!(out, "A-");
    }

    #[test]
    fn conditional_content_spans_lines() {
        let input = json!({ "ok": 1 });
        let out = resolve("{{#if ok}}line one\nline two{{/if}}", &input, &ResultMap::new());
        assert_eq!(out, "line one\nline two");
    }

    #[test]
    fn empty_arrays_and_objects_are_truthy() {
        let input = json!({ "list": [], "obj": {} });
        let out = resolve("{{#if list}}L{{/if}}{{#if obj}}O{{/if}}", &input, &ResultMap::new());
        assert_eq!(out, "LO");
    }

    #[test]
    fn strict_mode_accepts_fully_resolved_templates() {
        let out = resolve_strict("hi {{name}}", &json!({ "name": "Ada" }), &ResultMap::new());
        assert_eq!(out.unwrap(), "hi Ada");
    }

    #[test]
    fn strict_mode_reports_first_unresolved_reference() {
        let err = resolve_strict("{{name}} {{age}}", &json!({}), &ResultMap::new()).unwrap_err();
        assert_eq!(err, TemplateError::UnresolvedReference("name".into()));
    }
}
