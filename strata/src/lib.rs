#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # strata
//!
//! A hierarchical configuration resolution engine.
//!
//! Configuration documents live in layered stores and inherit from
//! parent scopes through an explicit `.parent` pointer. Resolution walks
//! that chain, deep-merges each ancestor underneath the child and can
//! then evaluate the merged document: rendering templated values,
//! coercing typed keys, validating against a schema and normalizing
//! encrypted entries.
//!
//! ## Core Types
//!
//! - [`Resolver`] and [`ResolveRequest`]: parent-chain resolution
//! - [`ConfigProvider`] and [`ProviderKind`]: backing-store abstraction
//! - [`Settings`]: explicit engine configuration
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use strata::provider::MemoryProvider;
//! use strata::{ProviderKind, ProviderRegistry, ResolveRequest, Resolver, Settings};
//!
//! let provider = Arc::new(MemoryProvider::new());
//! provider.seed("service", &[], json!({"replicas": 1}));
//! provider.seed("service", &["prod"], json!({"replicas": 3}));
//!
//! let mut registry = ProviderRegistry::new(ProviderKind::Store);
//! registry.insert(ProviderKind::Effective, provider);
//! let resolver = Resolver::new(registry, Settings::default());
//!
//! let mut request = ResolveRequest::named("service");
//! request.groups = vec!["prod".to_string()];
//! let doc = resolver.resolve(&request).unwrap();
//! assert_eq!(doc["replicas"], 3);
//! ```

pub mod document;
pub mod error;
pub mod eval;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod template;
pub mod validate;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use merge::{deep_merge, merge_all};
pub use normalize::Transformations;
pub use provider::{ConfigCache, ConfigProvider, ProviderKind};
pub use registry::ProviderRegistry;
pub use resolver::{ResolveRequest, Resolver};
pub use settings::{CacheSettings, SchemaCacheSettings, Settings};
pub use validate::SchemaConfig;
