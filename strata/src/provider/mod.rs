//! Backing-store providers for configuration documents.
//!
//! Every store variant implements the same capability set: load, write and
//! delete a named document at an ordered path of group segments. The
//! composite [`MergedProvider`] folds several providers together and
//! optionally consults a cache.

pub mod file;
pub mod memory;
pub mod merged;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

pub use file::FileProvider;
pub use memory::MemoryProvider;
pub use merged::MergedProvider;
pub use store::{StoreCache, StoreProvider};

/// Uniform capability implemented by every backing store.
///
/// A load of an absent document returns an empty mapping rather than an
/// error; decode failures surface as serialization errors that the
/// resolver wraps with the scope path being resolved.
pub trait ConfigProvider: Send + Sync {
    /// Loads the document stored under `name` at the given group path.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored document cannot be read or decoded.
    fn load(&self, name: &str, groups: &[String]) -> Result<Value>;

    /// Writes a document under `name` at the given group path.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be persisted.
    fn write(&self, name: &str, config: &Value, groups: &[String]) -> Result<()>;

    /// Deletes the document stored under `name` at the given group path.
    ///
    /// Deleting an absent document is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be updated.
    fn delete(&self, name: &str, groups: &[String]) -> Result<()>;
}

/// Cache capability used by the composite provider.
///
/// TTL and eviction are owned by the cache implementation and invisible
/// to callers.
pub trait ConfigCache: Send + Sync {
    /// Looks up a cached document, returning `None` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache store cannot be read.
    fn load(&self, name: &str, groups: &[String]) -> Result<Option<Value>>;

    /// Stores a document, refreshing its TTL if already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache store cannot be written.
    fn write(&self, name: &str, config: &Value, groups: &[String]) -> Result<()>;
}

/// Closed set of provider variants.
///
/// Replaces lookup-by-name-string dispatch with a tagged union so an
/// unknown provider type is a parse error at the edge instead of a
/// runtime registry miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Directory-tree YAML store.
    File,
    /// SQLite-backed key-value store.
    Store,
    /// Composite provider merging all configured members, optionally cached.
    #[default]
    Effective,
    /// Alias for the configured default provider.
    Default,
}

impl ProviderKind {
    /// All provider kinds, in declaration order.
    pub const ALL: [Self; 4] = [Self::File, Self::Store, Self::Effective, Self::Default];

    /// Returns the canonical lowercase name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Store => "store",
            Self::Effective => "effective",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "store" => Ok(Self::Store),
            "effective" => Ok(Self::Effective),
            "default" => Ok(Self::Default),
            other => Err(Error::ProviderNotFound {
                provider: other.to_string(),
            }),
        }
    }
}
