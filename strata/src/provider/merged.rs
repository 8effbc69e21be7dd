//! Composite provider folding several member stores.
//!
//! The effective view of a document merges every member provider at every
//! ancestor scope, from the requested group path up to the root. Deeper
//! paths take precedence over ancestors; at the same path, earlier members
//! win. An optional cache fronts the merge, and an optional write target
//! receives writes and deletes.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::merge::deep_merge;

use super::{ConfigCache, ConfigProvider};

/// A provider that merges the documents of its member providers.
///
/// Built explicitly from its parts rather than wrapping an existing
/// provider, so caching is visible in the composition:
///
/// ```
/// use std::sync::Arc;
/// use strata::provider::{MemoryProvider, MergedProvider};
///
/// let store = Arc::new(MemoryProvider::new());
/// let cache = Arc::new(MemoryProvider::new());
/// let merged = MergedProvider::new(vec![store.clone()])
///     .with_cache(cache)
///     .with_write_provider(store);
/// ```
pub struct MergedProvider {
    members: Vec<Arc<dyn ConfigProvider>>,
    cache: Option<Arc<dyn ConfigCache>>,
    write_provider: Option<Arc<dyn ConfigProvider>>,
}

impl MergedProvider {
    /// Creates a composite over the given member providers.
    ///
    /// At any one scope, precedence follows member order: the first
    /// member wins conflicts. Across scopes, depth outranks member
    /// order.
    #[must_use]
    pub fn new(members: Vec<Arc<dyn ConfigProvider>>) -> Self {
        Self {
            members,
            cache: None,
            write_provider: None,
        }
    }

    /// Fronts loads with a cache.
    ///
    /// A hit skips the merge entirely; either way the result is written
    /// back, which refreshes the entry's TTL.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ConfigCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Routes writes and deletes to the given provider.
    ///
    /// Without one, writes and deletes are silently dropped.
    #[must_use]
    pub fn with_write_provider(mut self, provider: Arc<dyn ConfigProvider>) -> Self {
        self.write_provider = Some(provider);
        self
    }

    /// Merges every member at every ancestor scope of `groups`.
    ///
    /// Scopes are walked from the requested path up to the root, every
    /// member in order at each step, so any document at a deeper scope
    /// beats any document at an ancestor scope.
    fn compute(&self, name: &str, groups: &[String]) -> Result<Value> {
        let mut merged = Value::Object(serde_json::Map::new());
        let mut scope = groups.to_vec();
        loop {
            for member in &self.members {
                let document = member.load(name, &scope)?;
                merged = deep_merge(&merged, &document);
            }
            if scope.pop().is_none() {
                break;
            }
        }
        Ok(merged)
    }
}

impl ConfigProvider for MergedProvider {
    fn load(&self, name: &str, groups: &[String]) -> Result<Value> {
        let Some(cache) = &self.cache else {
            return self.compute(name, groups);
        };
        let config = match cache.load(name, groups)? {
            Some(cached) => cached,
            None => self.compute(name, groups)?,
        };
        cache.write(name, &config, groups)?;
        Ok(config)
    }

    fn write(&self, name: &str, config: &Value, groups: &[String]) -> Result<()> {
        match &self.write_provider {
            Some(provider) => provider.write(name, config, groups),
            None => Ok(()),
        }
    }

    fn delete(&self, name: &str, groups: &[String]) -> Result<()> {
        match &self.write_provider {
            Some(provider) => provider.delete(name, groups),
            None => Ok(()),
        }
    }
}
