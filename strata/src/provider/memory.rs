//! In-memory provider.
//!
//! Holds documents in a process-local map. Used as the default wiring for
//! tests and for embedding the resolver without a persistent store.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Map, Value};

use crate::error::Result;

use super::{ConfigCache, ConfigProvider};

/// A provider backed by a process-local map.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::provider::{ConfigProvider, MemoryProvider};
///
/// let provider = MemoryProvider::new();
/// let groups = vec!["team".to_string()];
/// provider.write("app", &json!({"key": "value"}), &groups).unwrap();
///
/// let doc = provider.load("app", &groups).unwrap();
/// assert_eq!(doc["key"], "value");
/// ```
#[derive(Default)]
pub struct MemoryProvider {
    documents: RwLock<HashMap<String, Value>>,
}

impl MemoryProvider {
    /// Creates an empty in-memory provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document, a convenience for constructing fixtures.
    pub fn seed(&self, name: &str, groups: &[&str], document: Value) {
        let groups: Vec<String> = groups.iter().map(|g| (*g).to_string()).collect();
        let mut documents = self.lock_write();
        documents.insert(Self::key(name, &groups), document);
    }

    fn key(name: &str, groups: &[String]) -> String {
        format!("{}@{}", name, groups.join("/"))
    }

    fn lock_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Value>> {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ConfigProvider for MemoryProvider {
    fn load(&self, name: &str, groups: &[String]) -> Result<Value> {
        let documents = self.lock_read();
        Ok(documents
            .get(&Self::key(name, groups))
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    fn write(&self, name: &str, config: &Value, groups: &[String]) -> Result<()> {
        let mut documents = self.lock_write();
        documents.insert(Self::key(name, groups), config.clone());
        Ok(())
    }

    fn delete(&self, name: &str, groups: &[String]) -> Result<()> {
        let mut documents = self.lock_write();
        documents.remove(&Self::key(name, groups));
        Ok(())
    }
}

impl ConfigCache for MemoryProvider {
    fn load(&self, name: &str, groups: &[String]) -> Result<Option<Value>> {
        let documents = self.lock_read();
        Ok(documents.get(&Self::key(name, groups)).cloned())
    }

    fn write(&self, name: &str, config: &Value, groups: &[String]) -> Result<()> {
        ConfigProvider::write(self, name, config, groups)
    }
}
