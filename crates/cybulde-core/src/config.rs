//! Application configuration, loaded from YAML and passed explicitly to each component.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::verdict::AssetPool;

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

const DEFAULT_SAMPLE_SIZE: usize = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cleaning endpoint, queried as `GET <url>?text=...`.
    pub data_processing_service_url: String,
    /// Classification endpoint, queried as `GET <url>?text=...`.
    pub model_prediction_service_url: String,
    /// Parquet file with a `text` column.
    pub dataset_path: PathBuf,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub harmless_gifs: Vec<String>,
    pub cyberbullying_gifs: Vec<String>,
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl AppConfig {
    /// Read, parse and validate a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("data_processing_service_url", &self.data_processing_service_url)?;
        check_url("model_prediction_service_url", &self.model_prediction_service_url)?;

        if self.dataset_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("dataset_path is empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        for pool in [AssetPool::Harmless, AssetPool::Cyberbullying] {
            if self.pool(pool).is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{} must list at least one asset",
                    pool.config_key()
                )));
            }
        }
        Ok(())
    }

    /// Asset references configured for a pool.
    pub fn pool(&self, pool: AssetPool) -> &[String] {
        match pool {
            AssetPool::Harmless => &self.harmless_gifs,
            AssetPool::Cyberbullying => &self.cyberbullying_gifs,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn check_url(key: &str, url: &str) -> Result<(), ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::Invalid(format!("{key} is empty")));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid(format!(
            "{key} must be an http(s) URL, got {url:?}"
        )));
    }
    Ok(())
}
