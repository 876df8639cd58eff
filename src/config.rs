//! Configuration loading
//!
//! YAML file with kebab-case keys. Resolution order: an explicit path, then
//! `./tripgraph.yaml`, then `~/.config/tripgraph/config.yaml`, then built-in
//! defaults. Every field has a default so a partial file is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub llm: LlmConfig,
    pub connectors: ConnectorConfig,
    pub workflow: WorkflowConfig,
}

/// Text-generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2:3b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            timeout_ms: 60_000,
            temperature: 0.7,
        }
    }
}

/// External connector settings, shared by the places and weather clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConnectorConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    /// 0 disables request spacing
    pub requests_per_minute: u32,
    pub search_radius_m: u32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GOOGLE_API_KEY".to_string(),
            timeout_ms: 30_000,
            max_retries: 3,
            requests_per_minute: 60,
            search_radius_m: 5_000,
        }
    }
}

/// Workflow execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorkflowConfig {
    /// Hard cap on optimization loops per run
    pub max_optimization_rounds: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_optimization_rounds: 2,
        }
    }
}

impl Config {
    /// Load configuration with the documented fallback chain
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = Path::new("tripgraph.yaml");
        if local.exists() {
            return Self::from_file(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user = config_dir.join("tripgraph").join("config.yaml");
            if user.exists() {
                return Self::from_file(&user);
            }
        }

        debug!("config: no file found, using defaults");
        Ok(Self::default())
    }

    /// Parse one YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "config: loaded");
        Ok(config)
    }
}
