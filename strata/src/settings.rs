//! Engine settings.
//!
//! Everything the resolver and provider wiring needs is carried in an
//! explicit [`Settings`] value constructed at start-up. There is no
//! process-global state; tests build their own settings and hand them to
//! [`crate::registry::ProviderRegistry`] and [`crate::resolver::Resolver`].
//!
//! Settings load from a YAML file and accept `STRATA_*` environment
//! variable overrides.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::provider::ProviderKind;

fn default_base_dir() -> PathBuf {
    home::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".strata")
}

/// Read-through cache wiring for the effective provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CacheSettings {
    /// Whether the effective provider consults the cache at all.
    pub enabled: bool,
    /// SQLite database file backing the cache.
    pub path: PathBuf,
    /// Entry time-to-live in seconds.
    pub ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_base_dir().join("cache.db"),
            ttl_seconds: 120,
        }
    }
}

/// Bounds for the compiled-schema cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SchemaCacheSettings {
    /// Maximum number of cached schemas before the oldest is evicted.
    pub capacity: usize,
    /// Entry time-to-live in seconds.
    pub ttl_seconds: u64,
}

impl Default for SchemaCacheSettings {
    fn default() -> Self {
        Self {
            capacity: 50,
            ttl_seconds: 300,
        }
    }
}

/// Complete engine configuration.
///
/// # Examples
///
/// ```
/// use strata::settings::Settings;
///
/// let mut settings = Settings::default();
/// settings.root_name = "platform".to_string();
/// assert!(settings.cache.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Concrete member providers of the effective view, highest
    /// precedence first. Only `file` and `store` are valid members.
    pub providers: Vec<ProviderKind>,
    /// The kind the `default` alias resolves to.
    pub default_provider: ProviderKind,
    /// Root directory of the file provider.
    pub file_root: PathBuf,
    /// SQLite database file of the store provider.
    pub store_path: PathBuf,
    /// Effective-provider cache wiring.
    pub cache: CacheSettings,
    /// Compiled-schema cache bounds.
    pub schema_cache: SchemaCacheSettings,
    /// Name of the synthetic top of every parent chain.
    pub root_name: String,
    /// Name looked up once more when the root config points at itself,
    /// carrying installation-wide defaults.
    pub bootstrap_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        let base = default_base_dir();
        Self {
            providers: vec![ProviderKind::Store, ProviderKind::File],
            default_provider: ProviderKind::Store,
            file_root: base.join("config"),
            store_path: base.join("store.db"),
            cache: CacheSettings::default(),
            schema_cache: SchemaCacheSettings::default(),
            root_name: "root".to_string(),
            bootstrap_name: "cluster-defaults".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from a YAML file, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded, or if an
    /// override value is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_yaml::from_str(&contents)?;
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    /// Builds default settings with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an override value is invalid.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    /// Applies `STRATA_*` environment variable overrides in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Settings`] if an override value does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(root) = env::var("STRATA_FILE_ROOT") {
            self.file_root = PathBuf::from(root);
        }

        if let Ok(path) = env::var("STRATA_STORE_PATH") {
            self.store_path = PathBuf::from(path);
        }

        if let Ok(kind) = env::var("STRATA_DEFAULT_PROVIDER") {
            self.default_provider = kind.parse()?;
        }

        if let Ok(val) = env::var("STRATA_CACHE_ENABLED") {
            self.cache.enabled = parse_bool("STRATA_CACHE_ENABLED", &val)?;
        }

        if let Ok(path) = env::var("STRATA_CACHE_PATH") {
            self.cache.path = PathBuf::from(path);
        }

        if let Ok(val) = env::var("STRATA_CACHE_TTL_SECONDS") {
            self.cache.ttl_seconds = parse_u64("STRATA_CACHE_TTL_SECONDS", &val)?;
        }

        if let Ok(name) = env::var("STRATA_ROOT_NAME") {
            self.root_name = name;
        }

        if let Ok(name) = env::var("STRATA_BOOTSTRAP_NAME") {
            self.bootstrap_name = name;
        }

        Ok(())
    }
}

/// Accepts true/1/yes/on and false/0/no/off, case-insensitive.
fn parse_bool(field: &str, s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::Settings {
            reason: format!(
                "{field}: invalid boolean '{s}' (expected true/false/1/0/yes/no/on/off)"
            ),
        }),
    }
}

fn parse_u64(field: &str, s: &str) -> Result<u64> {
    s.parse().map_err(|_| Error::Settings {
        reason: format!("{field}: invalid integer '{s}'"),
    })
}
