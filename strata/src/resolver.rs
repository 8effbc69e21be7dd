//! Hierarchical configuration resolution.
//!
//! A document may point at a parent through its `.parent` key; resolution
//! walks that chain, merging each ancestor underneath the child, then
//! optionally runs the evaluation pipeline (template evaluation, typed
//! coercion, schema validation, encrypted-entry normalization) over the
//! merged result.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{json, Map, Value};

use crate::document::{scalar_string, truthy};
use crate::error::{Error, Result};
use crate::eval::evaluate_config;
use crate::logging::Logger;
use crate::merge::deep_merge;
use crate::normalize::{normalize_config, Transformations};
use crate::provider::ProviderKind;
use crate::registry::ProviderRegistry;
use crate::settings::Settings;
use crate::validate::{validate_document, SchemaCache, SchemaConfig};

/// Everything a resolution needs, in one typed value.
///
/// `name` defaults to the configured root name when absent. The default
/// request resolves through the effective provider without evaluation.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Name of the document to resolve.
    pub name: Option<String>,
    /// Provider kind to resolve through.
    pub provider: ProviderKind,
    /// Ordered group path to resolve at.
    pub groups: Vec<String>,
    /// Whether to run the evaluation pipeline on the merged document.
    pub evaluate: bool,
    /// Fallback document merged at the lowest precedence.
    pub default_config: Option<Value>,
    /// Variables visible to every template before the document's own.
    pub default_variables: Map<String, Value>,
    /// Keys coerced to booleans or integers after evaluation.
    pub transformations: Transformations,
    /// Schema the evaluated document must satisfy.
    pub schema_config: Option<SchemaConfig>,
    /// Keys whose entries are normalized to `{value, encrypted}`.
    pub encrypted_keys: Vec<String>,
}

impl ResolveRequest {
    /// Creates a request for a named document with default options.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

/// Removes each group matched by a following `..` marker.
#[must_use]
pub fn expand_groups(groups: &[String]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(groups.len());
    for group in groups {
        if group == ".." {
            expanded.pop();
        } else {
            expanded.push(group.clone());
        }
    }
    expanded
}

/// Expands a parent's group path relative to the current one.
///
/// A leading `..` substitutes the current path minus its last segment;
/// any remaining `..` markers collapse pairwise.
#[must_use]
pub fn expand_parent_groups(groups: &[String], parent_groups: &[String]) -> Vec<String> {
    if parent_groups.is_empty() {
        return Vec::new();
    }
    if parent_groups[0] == ".." {
        let mut rebased: Vec<String> =
            groups[..groups.len().saturating_sub(1)].to_vec();
        rebased.extend_from_slice(&parent_groups[1..]);
        return expand_groups(&rebased);
    }
    expand_groups(parent_groups)
}

/// Resolves documents through a provider registry.
pub struct Resolver {
    registry: ProviderRegistry,
    settings: Settings,
    schema_cache: Mutex<SchemaCache>,
    logger: Logger,
}

impl Resolver {
    /// Creates a resolver over an already-built registry.
    #[must_use]
    pub fn new(registry: ProviderRegistry, settings: Settings) -> Self {
        let schema_cache = Mutex::new(SchemaCache::new(settings.schema_cache));
        Self {
            registry,
            settings,
            schema_cache,
            logger: Logger::default(),
        }
    }

    /// Routes resolution diagnostics through the given logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Builds the registry from the settings and wraps it in a resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if a backing store cannot be opened.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let registry = ProviderRegistry::from_settings(&settings)?;
        Ok(Self::new(registry, settings))
    }

    /// The settings this resolver was built with.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The provider registry backing this resolver.
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Resolves a document: walks the parent chain, merges ancestors
    /// underneath the child and, when requested, evaluates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider is unknown, a stored document does
    /// not decode, a template fails to render, or the evaluated document
    /// fails schema validation.
    pub fn resolve(&self, request: &ResolveRequest) -> Result<Value> {
        self.resolve_inner(request, HashSet::new())
    }

    fn resolve_inner(&self, request: &ResolveRequest, mut processed: HashSet<String>) -> Result<Value> {
        let name = request
            .name
            .clone()
            .unwrap_or_else(|| self.settings.root_name.clone());
        let key = format!("{}:{}", request.provider, request.groups.join("/"));
        if processed.contains(&key) {
            if name == self.settings.root_name {
                // The synthetic top points at itself; fold the second
                // visit into one bootstrap lookup for global defaults.
                let mut bootstrap = request.clone();
                bootstrap.name = Some(self.settings.bootstrap_name.clone());
                return self.resolve_inner(&bootstrap, HashSet::new());
            }
            self.logger
                .debug(&format!("parent chain revisited {key}; stopping with an empty document"));
            return Ok(Value::Object(Map::new()));
        }
        processed.insert(key);

        let provider = self.registry.get(request.provider)?;
        let loaded = provider
            .load(&name, &request.groups)
            .map_err(|err| scope_parse_error(err, &request.groups))?;
        let mut document = match loaded {
            Value::Object(map) => map,
            other => {
                return Err(Error::Parse {
                    paths: request.groups.clone(),
                    reason: format!("expected a mapping document, got {other}"),
                })
            }
        };

        let stored_parent = document
            .remove(".parent")
            .unwrap_or_else(|| Value::Object(Map::new()));
        let parent = deep_merge(
            &stored_parent,
            &json!({
                "provider-type": request.provider.as_str(),
                "name": name,
                "groups": [".."],
                "enabled": true,
            }),
        );

        let mut merged = Value::Object(document);
        if truthy(&parent["enabled"]) {
            let parent_groups = parent["groups"]
                .as_array()
                .map(|groups| groups.iter().map(scalar_string).collect::<Vec<_>>())
                .unwrap_or_default();
            let parent_request = ResolveRequest {
                name: Some(scalar_string(&parent["name"])),
                provider: scalar_string(&parent["provider-type"]).parse()?,
                groups: expand_parent_groups(&request.groups, &parent_groups),
                ..ResolveRequest::default()
            };
            let ancestor = self.resolve_inner(&parent_request, processed)?;
            merged = deep_merge(&merged, &ancestor);
        }
        if let Some(default_config) = &request.default_config {
            merged = deep_merge(&merged, default_config);
        }

        if !request.evaluate {
            return Ok(merged);
        }
        let evaluated =
            evaluate_config(&merged, &request.default_variables, &request.transformations)?;
        self.apply_schema(&evaluated, request.schema_config.as_ref(), &request.groups)?;
        Ok(normalize_config(&evaluated, &request.encrypted_keys))
    }

    fn apply_schema(
        &self,
        config: &Value,
        schema_config: Option<&SchemaConfig>,
        groups: &[String],
    ) -> Result<()> {
        let Some(schema_config) = schema_config else {
            return Ok(());
        };
        let Some(schema_name) = &schema_config.schema else {
            return Ok(());
        };
        let provider = schema_config.provider.unwrap_or_default();
        let schema = self.load_schema(schema_name, &schema_config.groups, provider)?;
        validate_document(config, schema_name, &schema, groups)
    }

    /// Resolves a schema document through the engine itself, caching the
    /// result.
    fn load_schema(
        &self,
        name: &str,
        groups: &[String],
        provider: ProviderKind,
    ) -> Result<Value> {
        let key = SchemaCache::key(name, groups, provider);
        if let Some(schema) = self.lock_schema_cache().get(&key) {
            return Ok(schema);
        }
        let request = ResolveRequest {
            name: Some(name.to_string()),
            provider,
            groups: groups.to_vec(),
            ..ResolveRequest::default()
        };
        let schema = self.resolve(&request)?;
        self.lock_schema_cache().put(key, schema.clone());
        Ok(schema)
    }

    fn lock_schema_cache(&self) -> MutexGuard<'_, SchemaCache> {
        self.schema_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes a document through the given provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unknown or the write fails.
    pub fn write_config(
        &self,
        name: &str,
        config: &Value,
        groups: &[String],
        provider: ProviderKind,
    ) -> Result<()> {
        self.registry.get(provider)?.write(name, config, groups)
    }

    /// Deletes a document through the given provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unknown or the delete fails.
    pub fn delete_config(
        &self,
        name: &str,
        groups: &[String],
        provider: ProviderKind,
    ) -> Result<()> {
        self.registry.get(provider)?.delete(name, groups)
    }
}

/// Re-scopes decode failures to the group path being resolved.
fn scope_parse_error(err: Error, groups: &[String]) -> Error {
    match err {
        Error::Serialization(inner) => Error::Parse {
            paths: groups.to_vec(),
            reason: inner.to_string(),
        },
        other => other,
    }
}
