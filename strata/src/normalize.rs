//! Post-evaluation type normalization.
//!
//! Rendered documents are all-string at the leaves; this module coerces
//! designated keys back to booleans and integers, and gives entries under
//! encrypted-eligible keys the uniform `{value, encrypted}` shape.

use serde_json::{json, Map, Value};

use crate::document::{scalar_string, truthy};
use crate::error::{Error, Result};

/// String values treated as `true` by boolean coercion (case-insensitive).
pub const BOOLEAN_TRUE_VALUES: [&str; 5] = ["true", "yes", "y", "1", "on"];

/// Keys whose string values are coerced after evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Transformations {
    /// Keys coerced to booleans.
    pub boolean_keys: Vec<String>,
    /// Keys coerced to integers.
    pub number_keys: Vec<String>,
}

/// Coerces string values under the listed keys to their target types.
///
/// Only string values are touched: nulls and values of other types pass
/// through, nested mappings recurse, and sequences recurse element-wise.
/// Strings directly inside a sequence are never coerced.
///
/// # Errors
///
/// Returns [`Error::Value`] with the offending location when a value
/// under a number key does not parse as an integer.
pub fn transform_string_values(config: &Value, transformations: &Transformations) -> Result<Value> {
    convert(config, transformations, "/")
}

fn convert(value: &Value, transformations: &Transformations, location: &str) -> Result<Value> {
    let Value::Object(map) = value else {
        return Ok(value.clone());
    };
    let mut converted = Map::new();
    for (key, val) in map {
        let new_val = match val {
            Value::Null => Value::Null,
            Value::String(s) if transformations.boolean_keys.iter().any(|k| k == key) => {
                Value::Bool(BOOLEAN_TRUE_VALUES.contains(&s.to_lowercase().as_str()))
            }
            Value::String(s) if transformations.number_keys.iter().any(|k| k == key) => {
                let number: i64 = s.trim().parse().map_err(|_| Error::Value {
                    location: format!("{location}{key}"),
                    value: val.clone(),
                    reason: format!("'{s}' is not a valid integer"),
                })?;
                Value::Number(number.into())
            }
            Value::Object(_) => convert(val, transformations, &format!("{location}{key}/"))?,
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    out.push(convert(
                        item,
                        transformations,
                        &format!("{location}{key}[{idx}]/"),
                    )?);
                }
                Value::Array(out)
            }
            other => other.clone(),
        };
        converted.insert(key.clone(), new_val);
    }
    Ok(Value::Object(converted))
}

/// Wraps every entry of a mapping under an encrypted-eligible key into
/// the `{value, encrypted}` shape.
///
/// Entries already shaped keep their `encrypted` flag (default `false`)
/// and have `value` stringified; a missing or falsy value becomes the
/// empty string. Bare entries wrap as plaintext. Mappings under other
/// keys recurse; scalars pass through untouched.
#[must_use]
pub fn normalize_config(config: &Value, encrypted_keys: &[String]) -> Value {
    let Value::Object(map) = config else {
        return config.clone();
    };
    let mut normalized = Map::new();
    for (key, val) in map {
        let new_val = match val {
            Value::Object(entries) if encrypted_keys.iter().any(|k| k == key) => Value::Object(
                entries
                    .iter()
                    .map(|(entry_key, entry_val)| {
                        (entry_key.clone(), normalize_encrypted_entry(entry_val))
                    })
                    .collect(),
            ),
            Value::Object(_) => normalize_config(val, encrypted_keys),
            other => other.clone(),
        };
        normalized.insert(key.clone(), new_val);
    }
    Value::Object(normalized)
}

fn normalize_encrypted_entry(entry: &Value) -> Value {
    match entry {
        Value::Object(map) => {
            let raw = map.get("value").cloned().unwrap_or(Value::Null);
            let value = if truthy(&raw) {
                scalar_string(&raw)
            } else {
                String::new()
            };
            let encrypted = map.get("encrypted").cloned().unwrap_or(Value::Bool(false));
            json!({"value": value, "encrypted": encrypted})
        }
        other => json!({"value": scalar_string(other), "encrypted": false}),
    }
}
