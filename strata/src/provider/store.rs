//! SQLite-backed key-value store and TTL cache.
//!
//! Documents are stored as YAML text keyed by `(name, path)`, where path
//! is the slash-joined group segments. The cache variant adds an expiry
//! column; expired entries are treated as misses and removed on read.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};

use crate::document;
use crate::error::Result;

use super::{ConfigCache, ConfigProvider};

/// SQL statement to create the documents table.
const CREATE_DOCUMENTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS documents (
        name TEXT NOT NULL,
        path TEXT NOT NULL,
        body TEXT NOT NULL,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (name, path)
    )";

/// SQL statement to create the cache table.
///
/// `expires_at` is a unix timestamp; rows past it are treated as absent.
const CREATE_CACHE_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS cache_entries (
        name TEXT NOT NULL,
        path TEXT NOT NULL,
        body TEXT NOT NULL,
        expires_at INTEGER NOT NULL,
        PRIMARY KEY (name, path)
    )";

fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;

    // WAL for concurrent readers; journal_mode returns a row
    let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.execute_batch("PRAGMA synchronous = NORMAL")?;
    conn.execute_batch("PRAGMA busy_timeout = 5000")?;

    conn.execute_batch(CREATE_DOCUMENTS_TABLE)?;
    conn.execute_batch(CREATE_CACHE_TABLE)?;
    Ok(conn)
}

fn joined(groups: &[String]) -> String {
    groups.join("/")
}

/// A provider backed by a SQLite database.
///
/// # Examples
///
/// ```no_run
/// use serde_json::json;
/// use strata::provider::{ConfigProvider, StoreProvider};
///
/// let provider = StoreProvider::open("/var/lib/strata/store.db").unwrap();
/// provider.write("app", &json!({"key": "value"}), &[]).unwrap();
/// ```
pub struct StoreProvider {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl StoreProvider {
    /// Opens (creating if needed) the store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = open_connection(&path)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Returns the database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConfigProvider for StoreProvider {
    fn load(&self, name: &str, groups: &[String]) -> Result<Value> {
        let body: Option<String> = self
            .conn()
            .query_row(
                "SELECT body FROM documents WHERE name = ?1 AND path = ?2",
                params![name, joined(groups)],
                |row| row.get(0),
            )
            .optional()?;
        match body {
            Some(body) => document::from_yaml_str(&body),
            None => Ok(Value::Object(Map::new())),
        }
    }

    fn write(&self, name: &str, config: &Value, groups: &[String]) -> Result<()> {
        let body = document::to_yaml_string(config)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO documents (name, path, body, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, joined(groups), body, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }

    fn delete(&self, name: &str, groups: &[String]) -> Result<()> {
        self.conn().execute(
            "DELETE FROM documents WHERE name = ?1 AND path = ?2",
            params![name, joined(groups)],
        )?;
        Ok(())
    }
}

/// A TTL document cache backed by a SQLite database.
///
/// Writes refresh the expiry even when the body is unchanged, so a cache
/// hit on the read-through path still extends the entry's lifetime.
pub struct StoreCache {
    conn: Mutex<Connection>,
    ttl: Duration,
}

impl StoreCache {
    /// Opens (creating if needed) the cache at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl Into<PathBuf>, ttl: Duration) -> Result<Self> {
        let conn = open_connection(&path.into())?;
        Ok(Self {
            conn: Mutex::new(conn),
            ttl,
        })
    }

    /// Returns the configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConfigCache for StoreCache {
    fn load(&self, name: &str, groups: &[String]) -> Result<Option<Value>> {
        let path = joined(groups);
        let now = chrono::Utc::now().timestamp();
        let row: Option<(String, i64)> = self
            .conn()
            .query_row(
                "SELECT body, expires_at FROM cache_entries WHERE name = ?1 AND path = ?2",
                params![name, path],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            Some((body, expires_at)) if expires_at > now => {
                Ok(Some(document::from_yaml_str(&body)?))
            }
            Some(_) => {
                self.conn().execute(
                    "DELETE FROM cache_entries WHERE name = ?1 AND path = ?2",
                    params![name, path],
                )?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn write(&self, name: &str, config: &Value, groups: &[String]) -> Result<()> {
        let body = document::to_yaml_string(config)?;
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = chrono::Utc::now().timestamp().saturating_add(ttl);
        self.conn().execute(
            "INSERT OR REPLACE INTO cache_entries (name, path, body, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, joined(groups), body, expires_at],
        )?;
        Ok(())
    }
}
