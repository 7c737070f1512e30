//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server address used when neither flag, env nor config file set one
pub const DEFAULT_API_URL: &str = "http://localhost:8501";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
    /// Artifact used by `predict --local` when `--model` is not given
    pub model_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `~/.config/hitp/config.json`, if present
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Resolve the server address, with an explicit flag or env value winning
    pub fn api_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("hitp").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_url.is_none());
        assert_eq!(config.api_url(None), DEFAULT_API_URL);
    }

    #[test]
    fn test_file_values_and_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_url": "http://predictor:9000", "model_path": "/srv/model.onnx"}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.api_url(None), "http://predictor:9000");
        assert_eq!(
            config.api_url(Some("http://override:1".to_string())),
            "http://override:1"
        );
        assert_eq!(config.model_path, Some(PathBuf::from("/srv/model.onnx")));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
