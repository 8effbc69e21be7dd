//! Provider registry.
//!
//! An explicit map from [`ProviderKind`] to a constructed provider, built
//! once at start-up from [`Settings`]. The `default` kind is an alias
//! resolved at lookup time; the `effective` kind is the composite over
//! the configured members.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::provider::{
    ConfigProvider, FileProvider, MergedProvider, ProviderKind, StoreCache, StoreProvider,
};
use crate::settings::Settings;

/// Map of constructed providers keyed by kind.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use strata::provider::{MemoryProvider, ProviderKind};
/// use strata::registry::ProviderRegistry;
///
/// let mut registry = ProviderRegistry::new(ProviderKind::Store);
/// registry.insert(ProviderKind::Store, Arc::new(MemoryProvider::new()));
///
/// // `default` aliases the kind the registry was built with
/// assert!(registry.get(ProviderKind::Default).is_ok());
/// ```
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ConfigProvider>>,
    default_kind: ProviderKind,
}

impl ProviderRegistry {
    /// Creates an empty registry whose `default` alias resolves to the
    /// given kind.
    #[must_use]
    pub fn new(default_kind: ProviderKind) -> Self {
        Self {
            providers: HashMap::new(),
            default_kind,
        }
    }

    /// Builds the registry described by the settings: a file provider, a
    /// store provider and the effective composite over the configured
    /// members (cached when enabled, writing through the default kind).
    ///
    /// # Errors
    ///
    /// Returns an error if a backing store cannot be opened, or if the
    /// member list or default kind names a non-concrete provider.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let file: Arc<dyn ConfigProvider> = Arc::new(FileProvider::new(&settings.file_root));
        let store: Arc<dyn ConfigProvider> = Arc::new(StoreProvider::open(&settings.store_path)?);

        let concrete = |kind: ProviderKind| -> Result<Arc<dyn ConfigProvider>> {
            match kind {
                ProviderKind::File => Ok(Arc::clone(&file)),
                ProviderKind::Store => Ok(Arc::clone(&store)),
                ProviderKind::Effective | ProviderKind::Default => Err(Error::Settings {
                    reason: format!("'{kind}' is not a concrete provider"),
                }),
            }
        };

        let members = settings
            .providers
            .iter()
            .map(|kind| concrete(*kind))
            .collect::<Result<Vec<_>>>()?;

        let mut effective =
            MergedProvider::new(members).with_write_provider(concrete(settings.default_provider)?);
        if settings.cache.enabled {
            let cache = StoreCache::open(
                &settings.cache.path,
                Duration::from_secs(settings.cache.ttl_seconds),
            )?;
            effective = effective.with_cache(Arc::new(cache));
        }

        let mut registry = Self::new(settings.default_provider);
        registry.insert(ProviderKind::File, file);
        registry.insert(ProviderKind::Store, store);
        registry.insert(ProviderKind::Effective, Arc::new(effective));
        Ok(registry)
    }

    /// Registers (or replaces) the provider for a kind.
    pub fn insert(&mut self, kind: ProviderKind, provider: Arc<dyn ConfigProvider>) {
        self.providers.insert(kind, provider);
    }

    /// Looks up the provider for a kind, resolving the `default` alias.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProviderNotFound`] if no provider is registered
    /// under the kind.
    pub fn get(&self, kind: ProviderKind) -> Result<&Arc<dyn ConfigProvider>> {
        let resolved = if kind == ProviderKind::Default {
            self.default_kind
        } else {
            kind
        };
        self.providers
            .get(&resolved)
            .ok_or_else(|| Error::ProviderNotFound {
                provider: resolved.to_string(),
            })
    }

    /// The kind the `default` alias resolves to.
    #[must_use]
    pub const fn default_kind(&self) -> ProviderKind {
        self.default_kind
    }

    /// Registered kinds, in declaration order of [`ProviderKind::ALL`].
    #[must_use]
    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| *kind != ProviderKind::Default && self.providers.contains_key(kind))
            .collect()
    }
}
