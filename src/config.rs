//! Runtime configuration
//!
//! Loaded from a YAML file when one is given, then overridden by the
//! `TREATYMAP_ENDPOINT` and `TREATYMAP_DATASET` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// SPARQL endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Endpoint URL
    pub url: String,
    /// User-Agent header; Wikidata rejects anonymous clients
    pub user_agent: String,
    /// Request timeout in seconds (None = wait indefinitely)
    pub timeout_secs: Option<u64>,
    /// Languages passed to the label service
    pub language: String,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "https://query.wikidata.org/sparql".to_string(),
            user_agent: format!("treatymap/{}", crate::VERSION),
            timeout_secs: None,
            language: "en".to_string(),
        }
    }
}

/// HTTP API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub endpoint: EndpointConfig,
    /// Membership-size dataset (JSON array of `{organization, memberCount}`)
    pub dataset_path: PathBuf,
    pub server: ServerConfig,
}

impl AtlasConfig {
    /// Read a YAML config file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load from `path` if given, then apply environment overrides
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("TREATYMAP_ENDPOINT") {
            debug!("Endpoint overridden by TREATYMAP_ENDPOINT: {}", url);
            self.endpoint.url = url;
        }
        if let Ok(path) = std::env::var("TREATYMAP_DATASET") {
            debug!("Dataset overridden by TREATYMAP_DATASET: {}", path);
            self.dataset_path = PathBuf::from(path);
        }
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            dataset_path: PathBuf::from("data/treaty_members.json"),
            server: ServerConfig::default(),
        }
    }
}
