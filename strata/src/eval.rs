//! Template evaluation over configuration documents.
//!
//! A document tree may carry value nodes (`{value, template, encrypted}`),
//! `variables` scopes and `.defaults` sections. Evaluation renders every
//! templated value against the variable scope in effect, collapses
//! plaintext value nodes to their bare value and injects defaults into
//! sibling mappings. The walk is recursive and never mutates its input.

use std::cmp::Ordering;

use serde_json::{json, Map, Value};

use crate::document::truthy;
use crate::error::{Error, Result};
use crate::normalize::{transform_string_values, Transformations};
use crate::template;

/// Evaluates a full document: renders templates, then coerces typed keys.
///
/// The top-level `defaults` key is dropped before evaluation; it exists
/// only to host YAML anchors, which are already expanded by the time the
/// document reaches this point. The top-level `variables` section is
/// consumed into the root scope and does not appear in the output.
///
/// # Errors
///
/// Returns [`Error::Value`] carrying the document location of a value
/// that fails to render or coerce.
pub fn evaluate_config(
    config: &Value,
    default_variables: &Map<String, Value>,
    transformations: &Transformations,
) -> Result<Value> {
    let mut root = match config {
        Value::Object(map) => map.clone(),
        other => return evaluate_value(other, default_variables, "/"),
    };
    root.entry("variables".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    root.remove("defaults");
    let evaluated = evaluate_value(&Value::Object(root), default_variables, "/")?;
    transform_string_values(&evaluated, transformations)
}

/// Evaluates one subtree against the variable scope in effect.
///
/// Mappings with a `value` key are value nodes: `template` defaults to
/// true, `encrypted` to false. Rendered values are trimmed. A
/// non-encrypted node collapses to its bare value; an encrypted node
/// keeps its mapping shape with `template` removed. Other mappings
/// recurse, consuming a local `variables` section first and merging a
/// `.defaults` sibling (or, when absent, the deprecated `__defaults__`)
/// under each mapping child. Plain strings are trimmed but never
/// rendered.
///
/// # Errors
///
/// Returns [`Error::Value`] when a template fails to render.
pub fn evaluate_value(
    value: &Value,
    variables: &Map<String, Value>,
    location: &str,
) -> Result<Value> {
    match value {
        Value::Object(map) => {
            let mut map = map.clone();
            let scope = match map.remove("variables") {
                Some(local) => evaluate_variables(&local, variables)?,
                None => variables.clone(),
            };
            if map.contains_key("value") {
                evaluate_value_node(map, &scope, location)
            } else {
                evaluate_mapping(map, &scope, location)
            }
        }
        Value::Array(items) => {
            let item_location = format!("{location}[]/");
            items
                .iter()
                .map(|item| evaluate_value(item, variables, &item_location))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        Value::String(s) => Ok(Value::String(s.trim().to_string())),
        other => Ok(other.clone()),
    }
}

fn evaluate_value_node(
    mut node: Map<String, Value>,
    scope: &Map<String, Value>,
    location: &str,
) -> Result<Value> {
    let template = node
        .get("template")
        .map_or(true, truthy);
    let encrypted = node
        .get("encrypted")
        .cloned()
        .unwrap_or(Value::Bool(false));

    if template {
        let raw = node.get("value").cloned().unwrap_or(Value::Null);
        let rendered = template::render(&raw, scope).map_err(|err| Error::Value {
            location: location.to_string(),
            value: raw,
            reason: err.to_string(),
        })?;
        node.insert("value".to_string(), Value::String(rendered));
    }
    node.remove("template");

    if truthy(&encrypted) {
        node.insert("encrypted".to_string(), encrypted);
        Ok(Value::Object(node))
    } else {
        Ok(node.get("value").cloned().unwrap_or(Value::Null))
    }
}

fn evaluate_mapping(
    mut map: Map<String, Value>,
    scope: &Map<String, Value>,
    location: &str,
) -> Result<Value> {
    let defaults = map
        .remove(".defaults")
        .or_else(|| map.remove("__defaults__"));

    let mut evaluated = Map::new();
    for (key, child) in &map {
        let child = match (&defaults, child) {
            (Some(defaults), Value::Object(_)) if truthy(defaults) => {
                crate::merge::deep_merge(child, defaults)
            }
            _ => child.clone(),
        };
        evaluated.insert(
            key.clone(),
            evaluate_value(&child, scope, &format!("{location}{key}/"))?,
        );
    }
    Ok(Value::Object(evaluated))
}

/// Normalizes and evaluates a `variables` section into a flat scope.
///
/// Mapping entries default `{template: true, priority: 1, value: ""}`;
/// bare entries become `{value, template: false, priority: 0}`. Boolean
/// values are stringified lowercase. Entries evaluate in ascending
/// priority (stable, so equal priorities keep declaration order), and
/// each evaluated variable is immediately visible to later ones.
///
/// # Errors
///
/// Returns [`Error::Value`] at `/variables/<name>/` when an entry fails
/// to render.
pub fn evaluate_variables(
    variables: &Value,
    default_variables: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let mut scope = default_variables.clone();
    let Value::Object(entries) = variables else {
        return Ok(scope);
    };

    let mut normalized: Vec<(String, Map<String, Value>)> = entries
        .iter()
        .map(|(name, raw)| (name.clone(), normalize_variable(raw)))
        .collect();
    normalized.sort_by(|a, b| {
        priority_of(&a.1)
            .partial_cmp(&priority_of(&b.1))
            .unwrap_or(Ordering::Equal)
    });

    for (name, node) in normalized {
        let raw = node.get("value").cloned().unwrap_or(Value::Null);
        let evaluated = if node.get("template").map_or(true, truthy) {
            let rendered = template::render(&raw, &scope).map_err(|err| Error::Value {
                location: format!("/variables/{name}/"),
                value: Value::Object(node.clone()),
                reason: err.to_string(),
            })?;
            Value::String(rendered)
        } else {
            raw
        };
        scope.insert(name, evaluated);
    }
    Ok(scope)
}

fn normalize_variable(raw: &Value) -> Map<String, Value> {
    let mut node = match raw {
        Value::Object(map) => {
            let mut map = map.clone();
            map.entry("template".to_string()).or_insert(json!(true));
            map.entry("priority".to_string()).or_insert(json!(1));
            map.entry("value".to_string()).or_insert(json!(""));
            map
        }
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other.clone());
            map.insert("template".to_string(), json!(false));
            map.insert("priority".to_string(), json!(0));
            map
        }
    };
    if let Some(Value::Bool(b)) = node.get("value") {
        let lowercase = b.to_string();
        node.insert("value".to_string(), Value::String(lowercase));
    }
    node
}

fn priority_of(node: &Map<String, Value>) -> f64 {
    node.get("priority").and_then(Value::as_f64).unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_value_node_collapses_to_rendered_value() {
        let out = evaluate_value(
            &json!({"host": {"value": "{{ region }}.internal"}}),
            &scope(&[("region", json!("us-east-1"))]),
            "/",
        )
        .unwrap();
        assert_eq!(out, json!({"host": "us-east-1.internal"}));
    }

    #[test]
    fn test_value_node_template_false_keeps_raw() {
        let out = evaluate_value(
            &json!({"raw": {"value": " {{ not rendered }} ", "template": false}}),
            &Map::new(),
            "/",
        )
        .unwrap();
        assert_eq!(out, json!({"raw": " {{ not rendered }} "}));
    }

    #[test]
    fn test_encrypted_node_keeps_shape_without_template_key() {
        let out = evaluate_value(
            &json!({"secret": {"value": "cipher", "encrypted": true, "template": false}}),
            &Map::new(),
            "/",
        )
        .unwrap();
        assert_eq!(out["secret"], json!({"value": "cipher", "encrypted": true}));
    }

    #[test]
    fn test_plain_strings_trimmed_never_rendered() {
        let out = evaluate_value(&json!({"s": "  {{ x }}  "}), &Map::new(), "/").unwrap();
        assert_eq!(out["s"], "{{ x }}");
    }

    #[test]
    fn test_lists_evaluate_element_wise() {
        let out = evaluate_value(
            &json!({"hosts": [{"value": "{{ v }}-1"}, " plain "]}),
            &scope(&[("v", json!("h"))]),
            "/",
        )
        .unwrap();
        assert_eq!(out["hosts"], json!(["h-1", "plain"]));
    }

    #[test]
    fn test_render_failure_carries_location() {
        let err = evaluate_value(
            &json!({"web": {"host": {"value": "{{ unclosed"}}}),
            &Map::new(),
            "/",
        )
        .unwrap_err();
        match err {
            Error::Value { location, .. } => assert_eq!(location, "/web/host/"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_local_variables_shadow_inherited_scope() {
        let out = evaluate_value(
            &json!({
                "inner": {
                    "variables": {"v": {"value": "local-{{ v }}"}},
                    "node": {"value": "{{ v }}"},
                }
            }),
            &scope(&[("v", json!("outer"))]),
            "/",
        )
        .unwrap();
        assert_eq!(out["inner"]["node"], "local-outer");
    }

    #[test]
    fn test_defaults_merge_under_mapping_children() {
        let out = evaluate_value(
            &json!({
                "services": {
                    ".defaults": {"replicas": 1, "enabled": true},
                    "api": {"replicas": 3},
                    "worker": {},
                }
            }),
            &Map::new(),
            "/",
        )
        .unwrap();
        assert_eq!(out["services"]["api"], json!({"replicas": 3, "enabled": true}));
        assert_eq!(out["services"]["worker"], json!({"replicas": 1, "enabled": true}));
        assert!(out["services"].get(".defaults").is_none());
    }

    #[test]
    fn test_dunder_defaults_used_only_when_dot_defaults_absent() {
        let out = evaluate_value(
            &json!({"group": {"__defaults__": {"a": 1}, "child": {}}}),
            &Map::new(),
            "/",
        )
        .unwrap();
        assert_eq!(out["group"]["child"], json!({"a": 1}));

        // When both appear, only `.defaults` is consumed; `__defaults__`
        // stays behind as an ordinary sibling mapping.
        let out = evaluate_value(
            &json!({"group": {
                ".defaults": {"a": 1},
                "__defaults__": {"b": 2},
                "child": {},
            }}),
            &Map::new(),
            "/",
        )
        .unwrap();
        assert_eq!(out["group"]["child"], json!({"a": 1}));
        assert_eq!(out["group"]["__defaults__"], json!({"b": 2, "a": 1}));
    }

    #[test]
    fn test_defaults_do_not_touch_scalar_children() {
        let out = evaluate_value(
            &json!({"group": {".defaults": {"a": 1}, "name": "fixed"}}),
            &Map::new(),
            "/",
        )
        .unwrap();
        assert_eq!(out["group"], json!({"name": "fixed"}));
    }

    #[test]
    fn test_variables_priority_order_and_chaining() {
        let out = evaluate_variables(
            &json!({
                "derived": {"value": "{{ base }}-x", "priority": 2},
                "base": {"value": "b", "priority": 1},
            }),
            &Map::new(),
        )
        .unwrap();
        assert_eq!(out["base"], "b");
        assert_eq!(out["derived"], "b-x");
    }

    #[test]
    fn test_equal_priority_keeps_declaration_order() {
        let out = evaluate_variables(
            &json!({
                "first": {"value": "a"},
                "second": {"value": "{{ first }}-b"},
            }),
            &Map::new(),
        )
        .unwrap();
        assert_eq!(out["second"], "a-b");
    }

    #[test]
    fn test_bare_variable_is_plaintext_priority_zero() {
        let out = evaluate_variables(
            &json!({
                "templated": {"value": "{{ bare }}!", "priority": 1},
                "bare": "{{ leave-alone }}",
            }),
            &Map::new(),
        )
        .unwrap();
        // Bare entries evaluate first (priority 0) and are never rendered
        assert_eq!(out["bare"], "{{ leave-alone }}");
        assert_eq!(out["templated"], "{{ leave-alone }}!");
    }

    #[test]
    fn test_boolean_variable_stringified_lowercase() {
        let out = evaluate_variables(&json!({"flag": true}), &Map::new()).unwrap();
        assert_eq!(out["flag"], "true");
    }

    #[test]
    fn test_variable_render_failure_location() {
        let err = evaluate_variables(&json!({"bad": {"value": "{{ oops"}}), &Map::new())
            .unwrap_err();
        match err {
            Error::Value { location, .. } => assert_eq!(location, "/variables/bad/"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_variables_visible_and_overridable() {
        let out = evaluate_variables(
            &json!({"v": {"value": "{{ v }}-local"}}),
            &scope(&[("v", json!("default"))]),
        )
        .unwrap();
        assert_eq!(out["v"], "default-local");
    }

    #[test]
    fn test_evaluate_config_drops_defaults_and_variables_sections() {
        let out = evaluate_config(
            &json!({
                "defaults": {"anchor": "host"},
                "variables": {"region": {"value": "eu"}},
                "host": {"value": "{{ region }}.internal"},
            }),
            &Map::new(),
            &Transformations::default(),
        )
        .unwrap();
        assert_eq!(out, json!({"host": "eu.internal"}));
    }

    #[test]
    fn test_evaluate_config_applies_transformations() {
        let transformations = Transformations {
            boolean_keys: vec!["enabled".to_string()],
            number_keys: vec!["port".to_string()],
        };
        let out = evaluate_config(
            &json!({
                "variables": {"p": {"value": "8080"}},
                "port": {"value": "{{ p }}"},
                "enabled": {"value": "yes"},
            }),
            &Map::new(),
            &transformations,
        )
        .unwrap();
        assert_eq!(out, json!({"port": 8080, "enabled": true}));
    }

    #[test]
    fn test_input_never_mutated() {
        let input = json!({"n": {"value": "{{ v }}", "template": true}});
        let snapshot = input.clone();
        let _ = evaluate_value(&input, &scope(&[("v", json!("x"))]), "/").unwrap();
        assert_eq!(input, snapshot);
    }
}
