//! Deep merging of configuration documents.
//!
//! This module implements the precedence-aware recursive merge used
//! everywhere documents are combined: across providers, along parent
//! chains, and when injecting defaults.

use serde_json::{Map, Value};

/// Deep-merges `defaults` under `source`.
///
/// Every key present in `source` wins; keys only in `defaults` are copied
/// in; keys present in both recurse only when both sides are mappings,
/// otherwise `source`'s value wins outright. Neither input is mutated.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::merge::deep_merge;
///
/// let source = json!({"a": 1, "nested": {"x": 1}});
/// let defaults = json!({"b": 2, "nested": {"x": 9, "y": 2}});
///
/// let merged = deep_merge(&source, &defaults);
/// assert_eq!(merged, json!({"a": 1, "b": 2, "nested": {"x": 1, "y": 2}}));
/// ```
#[must_use]
pub fn deep_merge(source: &Value, defaults: &Value) -> Value {
    match (source, defaults) {
        (Value::Object(src), Value::Object(def)) => {
            let mut out = src.clone();
            for (key, default_value) in def {
                match src.get(key) {
                    // Key found in source: recursive merge
                    Some(source_value) => {
                        out.insert(key.clone(), deep_merge(source_value, default_value));
                    }
                    // Key not found in source: use the defaults
                    None => {
                        out.insert(key.clone(), default_value.clone());
                    }
                }
            }
            Value::Object(out)
        }
        _ => source.clone(),
    }
}

/// Folds a sequence of documents into one, with earlier documents taking
/// precedence over later ones.
///
/// Non-mapping entries contribute nothing, matching the tolerance the
/// resolution pipeline needs for absent or malformed store results.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::merge::merge_all;
///
/// let leaf = json!({"own": "x"});
/// let parent = json!({"shared": "v", "own": "overridden"});
///
/// let merged = merge_all([&leaf, &parent]);
/// assert_eq!(merged, json!({"own": "x", "shared": "v"}));
/// ```
#[must_use]
pub fn merge_all<'a, I>(documents: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut merged = Value::Object(Map::new());
    for document in documents {
        merged = deep_merge(&merged, document);
    }
    merged
}
