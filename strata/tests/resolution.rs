//! End-to-end resolution tests over an in-memory provider registry.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use strata::provider::MemoryProvider;
use strata::{
    deep_merge, ProviderKind, ProviderRegistry, ResolveRequest, Resolver, SchemaConfig, Settings,
};

fn strings(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| (*s).to_string()).collect()
}

fn resolver_over(provider: Arc<MemoryProvider>) -> Resolver {
    let mut settings = Settings::default();
    settings.cache.enabled = false;
    let mut registry = ProviderRegistry::new(ProviderKind::Store);
    registry.insert(ProviderKind::Store, provider.clone());
    registry.insert(ProviderKind::Effective, provider);
    Resolver::new(registry, settings)
}

#[test]
fn merge_is_idempotent() {
    let doc = json!({"a": {"b": 1}, "c": [1, 2]});
    assert_eq!(deep_merge(&doc, &doc), doc);
}

#[test]
fn ancestor_scope_contributes_shared_keys() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed("service-x", &["team"], json!({"shared": "v"}));
    provider.seed("service-x", &["team", "prod"], json!({"own": "x"}));

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.groups = strings(&["team", "prod"]);

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(doc, json!({"own": "x", "shared": "v"}));
}

#[test]
fn self_referential_scope_terminates_with_empty_contribution() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed(
        "service-x",
        &["a"],
        json!({".parent": {"groups": ["a"]}, "k": "leaf"}),
    );
    // The parent points back at the same scope; the revisit contributes
    // nothing and resolution still terminates.
    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.groups = strings(&["a"]);

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(doc, json!({"k": "leaf"}));
}

#[test]
fn defaults_injection_prefers_explicit_sibling_values() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed(
        "service-x",
        &[],
        json!({
            "deployers": {
                ".defaults": {"enabled": {"value": "yes"}, "url": {"value": "{{ base }}/deploy"}},
                "primary": {"url": {"value": "https://primary"}},
                "secondary": {},
            },
            "variables": {"base": {"value": "https://default"}},
        }),
    );

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.evaluate = true;

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(doc["deployers"]["primary"]["url"], "https://primary");
    assert_eq!(doc["deployers"]["primary"]["enabled"], "yes");
    assert_eq!(doc["deployers"]["secondary"]["url"], "https://default/deploy");
}

#[test]
fn variable_priority_chain_renders_in_order() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed(
        "service-x",
        &[],
        json!({
            "variables": {
                "var2": {"value": "{{ var1 }}-suffix", "priority": 2},
                "var1": {"value": "base", "priority": 1},
            },
            "out": {"value": "{{ var2 }}"},
        }),
    );

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.evaluate = true;

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(doc["out"], "base-suffix");
}

#[test]
fn plain_document_survives_evaluation_unchanged() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed(
        "service-x",
        &[],
        json!({"a": {"b": "c"}, "n": 42, "list": ["x", 1, true]}),
    );

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.evaluate = true;

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(doc, json!({"a": {"b": "c"}, "n": 42, "list": ["x", 1, true]}));
}

#[test]
fn templated_value_renders_against_document_variables() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed(
        "service-x",
        &[],
        json!({
            "variables": {"v": {"value": "X"}},
            "key": {"value": "{{ v }}-Y", "template": true},
        }),
    );

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.evaluate = true;

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(doc, json!({"key": "X-Y"}));
}

#[test]
fn encrypted_entries_normalize_to_uniform_shape() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed(
        "service-x",
        &[],
        json!({"environment": {"a": "1", "b": {"value": "2", "encrypted": true}}}),
    );

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.evaluate = true;
    request.encrypted_keys = strings(&["environment"]);

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(
        doc,
        json!({"environment": {
            "a": {"value": "1", "encrypted": false},
            "b": {"value": "2", "encrypted": true},
        }})
    );
}

#[test]
fn boolean_and_number_keys_coerce_after_rendering() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed(
        "service-x",
        &[],
        json!({"enabled": {"value": "true"}, "port": {"value": "9003"}}),
    );

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.evaluate = true;
    request.transformations.boolean_keys = strings(&["enabled"]);
    request.transformations.number_keys = strings(&["port"]);

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(doc, json!({"enabled": true, "port": 9003}));
}

#[test]
fn coercion_failure_names_the_offending_path() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed("service-x", &[], json!({"web": {"port": "eighty"}}));

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.evaluate = true;
    request.transformations.number_keys = strings(&["port"]);

    let err = resolver.resolve(&request).unwrap_err();
    assert_eq!(err.code(), "CONFIG_VALUE_ERROR");
    assert_eq!(err.to_details()["details"]["location"], "/web/port");
}

#[test]
fn default_variables_feed_the_scope() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed("service-x", &[], json!({"msg": {"value": "hello {{ who }}"}}));

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.evaluate = true;
    let mut default_variables = Map::new();
    default_variables.insert("who".to_string(), Value::String("world".to_string()));
    request.default_variables = default_variables;

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(doc["msg"], "hello world");
}

#[test]
fn schema_resolves_through_the_engine_and_validates() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed(
        "service-x",
        &[],
        json!({"replicas": {"value": "3"}}),
    );
    provider.seed(
        "deploy-schema",
        &[],
        json!({
            "type": "object",
            "properties": {"replicas": {"type": "integer", "minimum": 1}},
            "required": ["replicas"],
        }),
    );

    let resolver = resolver_over(provider);
    let mut request = ResolveRequest::named("service-x");
    request.evaluate = true;
    request.transformations.number_keys = strings(&["replicas"]);
    request.schema_config = Some(SchemaConfig {
        schema: Some("deploy-schema".to_string()),
        ..SchemaConfig::default()
    });

    let doc = resolver.resolve(&request).unwrap();
    assert_eq!(doc["replicas"], 3);

    // Drop the required key and the same request now fails validation
    resolver
        .write_config("service-x", &json!({"name": "x"}), &[], ProviderKind::Store)
        .unwrap();
    let err = resolver.resolve(&request).unwrap_err();
    assert_eq!(err.code(), "CONFIG_VALIDATION_ERROR");
    let details = err.to_details();
    assert_eq!(details["details"]["schema"], "deploy-schema");
    assert_eq!(details["details"]["schema-path"], "/required");
}

#[test]
fn raw_resolution_keeps_value_nodes_untouched() {
    let provider = Arc::new(MemoryProvider::new());
    provider.seed(
        "service-x",
        &[],
        json!({"key": {"value": "{{ v }}", "template": true}}),
    );

    let resolver = resolver_over(provider);
    let doc = resolver.resolve(&ResolveRequest::named("service-x")).unwrap();
    assert_eq!(doc["key"], json!({"value": "{{ v }}", "template": true}));
}
