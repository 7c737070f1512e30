//! Server configuration

use anyhow::{Context, Result};
use predictor_lib::predictor::DEFAULT_MODEL_PATH;
use serde::Deserialize;
use std::path::PathBuf;

/// Optional config file, looked up in the working directory
const CONFIG_FILE: &str = "hit-predictor";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP port for the form page and API
    #[serde(default = "default_port")]
    pub port: u16,

    /// Location of the exported classification pipeline
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "local".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            model_path: default_model_path(),
            log_format: LogFormat::default(),
            instance_name: default_instance_name(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `hit-predictor.toml` (optional) and `HITP_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix("HITP").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid hit-predictor configuration")
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr(), "0.0.0.0:8501");
        assert_eq!(config.model_path, PathBuf::from("models/spotify_model_pipeline.onnx"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_deserialize_overrides() {
        let config: ServerConfig = serde_json::from_str(
            r#"{"port": 9000, "model_path": "/srv/model.onnx", "log_format": "pretty"}"#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.model_path, PathBuf::from("/srv/model.onnx"));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_address, "0.0.0.0");
    }
}
