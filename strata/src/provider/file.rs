//! Directory-tree YAML store.
//!
//! Group segments map to nested directories under a root; the document
//! for a scope lives at `<root>/<group>/.../<name>.yml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::document;
use crate::error::Result;

use super::ConfigProvider;

/// A provider backed by a directory tree of YAML documents.
///
/// # Examples
///
/// ```no_run
/// use serde_json::json;
/// use strata::provider::{ConfigProvider, FileProvider};
///
/// let provider = FileProvider::new("/var/lib/strata/config");
/// let groups = vec!["team-a".to_string(), "prod".to_string()];
/// provider.write("service-x", &json!({"replicas": 3}), &groups).unwrap();
/// let doc = provider.load("service-x", &groups).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileProvider {
    root: PathBuf,
}

impl FileProvider {
    /// Creates a provider rooted at the given directory.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, name: &str, groups: &[String]) -> PathBuf {
        let mut path = self.root.clone();
        for group in groups {
            path.push(group);
        }
        path.push(format!("{name}.yml"));
        path
    }
}

impl ConfigProvider for FileProvider {
    fn load(&self, name: &str, groups: &[String]) -> Result<Value> {
        let path = self.document_path(name, groups);
        if !path.exists() {
            return Ok(Value::Object(Map::new()));
        }
        let contents = fs::read_to_string(&path)?;
        document::from_yaml_str(&contents)
    }

    fn write(&self, name: &str, config: &Value, groups: &[String]) -> Result<()> {
        let path = self.document_path(name, groups);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, document::to_yaml_string(config)?)?;
        Ok(())
    }

    fn delete(&self, name: &str, groups: &[String]) -> Result<()> {
        let path = self.document_path(name, groups);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn groups(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_load_absent_returns_empty_mapping() {
        let dir = TempDir::new().unwrap();
        let provider = FileProvider::new(dir.path());
        assert_eq!(provider.load("app", &groups(&["a"])).unwrap(), json!({}));
    }

    #[test]
    fn test_write_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let provider = FileProvider::new(dir.path());
        let path = groups(&["team-a", "prod"]);

        provider.write("service-x", &json!({"replicas": 3}), &path).unwrap();

        assert!(dir.path().join("team-a/prod/service-x.yml").exists());
        assert_eq!(
            provider.load("service-x", &path).unwrap(),
            json!({"replicas": 3})
        );
    }

    #[test]
    fn test_load_hand_authored_yaml() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("team")).unwrap();
        fs::write(
            dir.path().join("team/app.yml"),
            "shared: v\n8080: number-key\n",
        )
        .unwrap();

        let provider = FileProvider::new(dir.path());
        let doc = provider.load("app", &groups(&["team"])).unwrap();
        assert_eq!(doc["shared"], "v");
        // Non-string keys are stringified on load
        assert_eq!(doc["8080"], "number-key");
    }

    #[test]
    fn test_load_invalid_yaml_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.yml"), "a: [unclosed").unwrap();

        let provider = FileProvider::new(dir.path());
        assert!(provider.load("bad", &[]).is_err());
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let provider = FileProvider::new(dir.path());
        provider.write("app", &json!({"k": 1}), &[]).unwrap();

        provider.delete("app", &[]).unwrap();
        assert!(!dir.path().join("app.yml").exists());

        // Deleting again is a no-op
        provider.delete("app", &[]).unwrap();
    }

    #[test]
    fn test_yaml_round_trip_preserves_structure() {
        let dir = TempDir::new().unwrap();
        let provider = FileProvider::new(dir.path());
        let doc = json!({"nested": {"list": [1, "two"], "flag": true}});

        provider.write("app", &doc, &[]).unwrap();
        assert_eq!(provider.load("app", &[]).unwrap(), doc);
    }
}
