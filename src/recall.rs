//! Persistent list of recently searched addresses.
//!
//! The store is a small JSON object file standing in for browser-local
//! storage. The recall list lives under the fixed key `recentSearches`;
//! any other keys in the file are left alone on write.
//!
//! ```json
//! { "recentSearches": ["ada@example.com", "grace@example.com"] }
//! ```
//!
//! A missing, unreadable, or corrupt file reads as an empty history rather
//! than an error.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::config::RecallConfig;

/// Key the list is stored under.
pub const RECALL_KEY: &str = "recentSearches";

/// Inputs shorter than this never hit the suggestion endpoint.
pub const MIN_SUGGESTION_INPUT: usize = 2;

#[derive(Debug, Clone)]
pub struct RecallStore {
    path: PathBuf,
    capacity: usize,
}

impl RecallStore {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity: capacity.max(1),
        }
    }

    pub fn from_config(config: &RecallConfig) -> Self {
        Self::new(config.resolved_path(), config.capacity)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted list, most recent first.
    pub fn list(&self) -> Vec<String> {
        let Some(Value::Array(items)) = self.read_object().remove(RECALL_KEY) else {
            return Vec::new();
        };
        let mut list: Vec<String> = items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();
        list.truncate(self.capacity);
        list
    }

    /// Move `query` to the front, drop duplicates, cap the length, persist.
    ///
    /// Returns the updated list.
    pub fn record(&self, query: &str) -> Result<Vec<String>> {
        let mut list = vec![query.to_string()];
        list.extend(self.list().into_iter().filter(|q| q != query));
        list.truncate(self.capacity);

        let mut object = self.read_object();
        object.insert(
            RECALL_KEY.to_string(),
            Value::Array(list.iter().cloned().map(Value::String).collect()),
        );
        self.write_object(&object)?;
        tracing::debug!(path = %self.path.display(), len = list.len(), "recall list updated");
        Ok(list)
    }

    /// Forget all recorded queries.
    pub fn clear(&self) -> Result<()> {
        let mut object = self.read_object();
        if object.remove(RECALL_KEY).is_some() {
            self.write_object(&object)?;
        }
        Ok(())
    }

    fn read_object(&self) -> Map<String, Value> {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "recall store is corrupt, treating as empty");
                Map::new()
            }
        }
    }

    fn write_object(&self, object: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create recall directory: {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string_pretty(object)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write recall store: {}", self.path.display()))
    }
}

/// Whether `input` is long enough to ask the server for suggestions.
pub fn wants_remote_suggestions(input: &str) -> bool {
    input.chars().count() >= MIN_SUGGESTION_INPUT
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> RecallStore {
        RecallStore::new(tmp.path().join("recall.json"), 5)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(store(&tmp).list().is_empty());
    }

    #[test]
    fn test_same_query_twice_is_stored_once() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        s.record("ada@example.com").unwrap();
        s.record("ada@example.com").unwrap();
        assert_eq!(s.list(), vec!["ada@example.com"]);
    }

    #[test]
    fn test_capped_at_five_most_recent_first() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        for i in 1..=6 {
            s.record(&format!("user{}@example.com", i)).unwrap();
        }
        assert_eq!(
            s.list(),
            vec![
                "user6@example.com",
                "user5@example.com",
                "user4@example.com",
                "user3@example.com",
                "user2@example.com",
            ]
        );
    }

    #[test]
    fn test_rerecord_moves_to_front() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        s.record("a@x.io").unwrap();
        s.record("b@x.io").unwrap();
        s.record("c@x.io").unwrap();
        let list = s.record("a@x.io").unwrap();
        assert_eq!(list, vec!["a@x.io", "c@x.io", "b@x.io"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        s.record("Ada@example.com").unwrap();
        s.record("ada@example.com").unwrap();
        assert_eq!(s.list().len(), 2);
    }

    #[test]
    fn test_corrupt_file_reads_empty_and_recovers() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        fs::write(s.path(), "{not json").unwrap();
        assert!(s.list().is_empty());
        s.record("a@x.io").unwrap();
        assert_eq!(s.list(), vec!["a@x.io"]);
    }

    #[test]
    fn test_wrong_shape_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        fs::write(s.path(), r#"{"recentSearches": "a@x.io"}"#).unwrap();
        assert!(s.list().is_empty());
    }

    #[test]
    fn test_other_keys_survive_writes() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        fs::write(s.path(), r#"{"theme": "dark"}"#).unwrap();
        s.record("a@x.io").unwrap();
        let raw: Value = serde_json::from_str(&fs::read_to_string(s.path()).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[RECALL_KEY][0], "a@x.io");
    }

    #[test]
    fn test_clear() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        s.record("a@x.io").unwrap();
        s.clear().unwrap();
        assert!(s.list().is_empty());
    }

    #[test]
    fn test_creates_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let s = RecallStore::new(tmp.path().join("nested/dir/recall.json"), 5);
        s.record("a@x.io").unwrap();
        assert_eq!(s.list(), vec!["a@x.io"]);
    }

    #[test]
    fn test_suggestion_threshold() {
        assert!(!wants_remote_suggestions(""));
        assert!(!wants_remote_suggestions("a"));
        assert!(wants_remote_suggestions("ad"));
    }
}
