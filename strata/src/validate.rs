//! Structural validation of evaluated documents.
//!
//! Schemas are ordinary configuration documents resolved through the
//! engine itself, so they live in the same stores and inherit the same
//! way. Resolved schemas are held in a small TTL cache to keep repeated
//! validations from re-walking the parent chain.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::provider::ProviderKind;
use crate::settings::SchemaCacheSettings;

/// Names the schema an evaluated document must satisfy.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SchemaConfig {
    /// Name of the schema document. Validation is skipped when absent.
    pub schema: Option<String>,
    /// Group path the schema resolves at.
    pub groups: Vec<String>,
    /// Provider the schema resolves through.
    pub provider: Option<ProviderKind>,
}

/// Validates a document against a compiled schema.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the schema itself does not compile, or
/// [`Error::Validation`] carrying the schema name, the slash-joined path
/// of the failing schema fragment and the fragment itself.
pub fn validate_document(
    config: &Value,
    schema_name: &str,
    schema: &Value,
    groups: &[String],
) -> Result<()> {
    let compiled = JSONSchema::compile(schema).map_err(|err| Error::Parse {
        paths: groups.to_vec(),
        reason: err.to_string(),
    })?;

    if let Err(mut errors) = compiled.validate(config) {
        if let Some(err) = errors.next() {
            let schema_path = err.schema_path.to_string();
            let fragment = schema.pointer(&schema_path).cloned().unwrap_or(Value::Null);
            return Err(Error::Validation {
                schema: schema_name.to_string(),
                schema_path,
                reason: err.to_string(),
                fragment,
            });
        }
    }
    Ok(())
}

/// Bounded TTL cache for resolved schema documents.
///
/// Lookups beyond the entry's lifetime miss and drop the entry; inserts
/// past capacity evict the oldest entry.
pub struct SchemaCache {
    entries: HashMap<String, (Instant, Value)>,
    capacity: usize,
    ttl: Duration,
}

impl SchemaCache {
    /// Creates a cache with the given bounds.
    #[must_use]
    pub fn new(settings: SchemaCacheSettings) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: settings.capacity.max(1),
            ttl: Duration::from_secs(settings.ttl_seconds),
        }
    }

    /// Builds the canonical cache key for a schema lookup.
    #[must_use]
    pub fn key(name: &str, groups: &[String], provider: ProviderKind) -> String {
        format!("{provider}:{}:{name}", groups.join("/"))
    }

    /// Looks up a live entry, dropping it if expired.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some((inserted, value)) if inserted.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores an entry, evicting the oldest one when at capacity.
    pub fn put(&mut self, key: String, value: Value) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (inserted, _))| *inserted)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, (Instant::now(), value));
    }
}
