//! Configuration document representation and JSON-compatibility coercion.
//!
//! Documents are nested mappings authored in YAML but processed as
//! `serde_json::Value` trees. Schema validation requires a strict JSON
//! representation, so YAML-only constructs (non-string mapping keys,
//! tagged values) are coerced on load.

use serde_json::{Map, Number, Value};

use crate::error::Result;

/// A configuration document: a mapping from string keys to nested values.
pub type Document = Map<String, Value>;

/// Converts a YAML value into a JSON-compatible value.
///
/// Non-string mapping keys are stringified, tagged values are unwrapped,
/// and non-finite floats collapse to null. This mirrors the round-trip
/// through a strict JSON encoder that the resolution pipeline guarantees
/// for every returned document.
///
/// # Examples
///
/// ```
/// use serde_yaml::Value as Yaml;
/// use strata::document::from_yaml;
///
/// let yaml: Yaml = serde_yaml::from_str("8080: number-key").unwrap();
/// let json = from_yaml(&yaml);
/// assert_eq!(json["8080"], "number-key");
/// ```
#[must_use]
pub fn from_yaml(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => yaml_number(n),
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut out = Map::new();
            for (key, val) in mapping {
                out.insert(key_string(key), from_yaml(val));
            }
            Value::Object(out)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(&tagged.value),
    }
}

/// Parses a YAML document string into a JSON-compatible value.
///
/// An empty or null document becomes an empty mapping, matching what a
/// backing store returns for an absent scope.
///
/// # Errors
///
/// Returns a serialization error if the input is not valid YAML.
pub fn from_yaml_str(contents: &str) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(contents)?;
    let value = from_yaml(&yaml);
    if value.is_null() {
        return Ok(Value::Object(Map::new()));
    }
    Ok(value)
}

/// Serializes a document back to its human-authored YAML form.
///
/// # Errors
///
/// Returns a serialization error if the value cannot be represented as YAML.
pub fn to_yaml_string(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Truthiness of a document value, matching the loose-typing rules the
/// stored configuration relies on for flags like `enabled` and `encrypted`.
///
/// Null, false, zero, empty strings, empty sequences and empty mappings are
/// falsy; everything else is truthy.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Renders a scalar value as a string the way normalized environment
/// entries and template inputs expect: strings pass through, booleans are
/// lowercased, null becomes the empty string.
#[must_use]
pub fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(Number::from(i))
    } else if let Some(u) = n.as_u64() {
        Value::Number(Number::from(u))
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn key_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_yaml_str_stringifies_keys() {
        let value = from_yaml_str("8080: number-key\ntrue: bool-key\n").unwrap();
        assert_eq!(value["8080"], "number-key");
        assert_eq!(value["true"], "bool-key");
    }

    #[test]
    fn test_from_yaml_str_empty_document() {
        let value = from_yaml_str("").unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_from_yaml_str_nested() {
        let value = from_yaml_str("a:\n  b:\n    - 1\n    - two\n").unwrap();
        assert_eq!(value, json!({"a": {"b": [1, "two"]}}));
    }

    #[test]
    fn test_from_yaml_str_invalid() {
        assert!(from_yaml_str("a: [unclosed").is_err());
    }

    #[test]
    fn test_truthy() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!([])));
        assert!(!truthy(&json!({})));
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("x")));
        assert!(truthy(&json!({"a": 1})));
    }

    #[test]
    fn test_scalar_string() {
        assert_eq!(scalar_string(&json!("plain")), "plain");
        assert_eq!(scalar_string(&json!(2)), "2");
        assert_eq!(scalar_string(&json!(true)), "true");
        assert_eq!(scalar_string(&Value::Null), "");
    }

    #[test]
    fn test_yaml_round_trip() {
        let value = json!({"key": {"nested": [1, 2]}, "flag": true});
        let yaml = to_yaml_string(&value).unwrap();
        let back = from_yaml_str(&yaml).unwrap();
        assert_eq!(back, value);
    }
}
