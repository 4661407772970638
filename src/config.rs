//! TOML configuration.
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8001/api"
//! # timeout_secs = 30
//!
//! [recall]
//! # path = "~/.local/share/email-intel/recall.json"
//! capacity = 5
//! ```
//!
//! Both sections are optional; a missing section falls back to its
//! defaults.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name of the recall store inside the platform data directory.
const RECALL_FILENAME: &str = "recall.json";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub recall: RecallConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Unset means requests may wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8001/api".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecallConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            path: None,
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    5
}

impl RecallConfig {
    /// Resolve the recall file location.
    ///
    /// Uses the configured path when set, otherwise the platform data
    /// directory (`~/.local/share/email-intel` on Linux), otherwise the
    /// working directory.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        ProjectDirs::from("", "", "email-intel")
            .map(|dirs| dirs.data_dir().join(RECALL_FILENAME))
            .unwrap_or_else(|| PathBuf::from(RECALL_FILENAME))
    }
}

impl Config {
    /// Defaults used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    let base = config.api.base_url.trim();
    if base.is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }
    let url = reqwest::Url::parse(base)
        .with_context(|| format!("api.base_url is not a valid URL: '{}'", base))?;
    match url.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!("api.base_url must use http or https, got '{}'", other),
    }

    if config.api.timeout_secs == Some(0) {
        anyhow::bail!("api.timeout_secs must be > 0 when set");
    }

    if config.recall.capacity == 0 {
        anyhow::bail!("recall.capacity must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("eic.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:8001/api");
        assert_eq!(cfg.api.timeout_secs, None);
        assert_eq!(cfg.recall.capacity, 5);
    }

    #[test]
    fn test_full_config() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
[api]
base_url = "https://intel.example.com/api"
timeout_secs = 15

[recall]
path = "/tmp/recall.json"
capacity = 3
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.api.base_url, "https://intel.example.com/api");
        assert_eq!(cfg.api.timeout_secs, Some(15));
        assert_eq!(cfg.recall.capacity, 3);
        assert_eq!(
            cfg.recall.resolved_path(),
            PathBuf::from("/tmp/recall.json")
        );
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[api]\nbase_url = \"ftp://example.com\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[recall]\ncapacity = 0\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.api.base_url, default_base_url());
    }

    #[test]
    fn test_default_recall_path_ends_with_filename() {
        let cfg = Config::minimal();
        assert!(cfg.recall.resolved_path().ends_with(RECALL_FILENAME));
    }
}
