mod defaults;
mod providers;


pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::VitaeError;
use defaults::*;

/// Top-level Vitae configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vitae: VitaeConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// General agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitaeConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for VitaeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Profile and transcript store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Bearer token guarding the API. Empty = no check (for local-only use).
    #[serde(default)]
    pub api_key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            api_key: String::new(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

impl Config {
    /// Overlay environment variables on top of file values.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a closure.
    /// Empty values are ignored so an exported-but-blank variable never
    /// clobbers a key from the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OPENROUTER_API_KEY") {
            self.provider.openrouter.api_key = v;
        }
        if let Some(v) = get("OPENROUTER_API_URL") {
            self.provider.openrouter.api_url = v;
        }
        if let Some(v) = get("OPENROUTER_MODEL") {
            self.provider.openrouter.model = v;
        }
        if let Some(v) = get("HUGGINGFACE_API_KEY") {
            self.provider.huggingface.api_key = v;
        }
        if let Some(v) = get("HUGGINGFACE_MODEL") {
            self.provider.huggingface.model = v;
        }
        if let Some(v) = get("VITAE_DB_PATH") {
            self.memory.db_path = v;
        }
        if let Some(v) = get("VITAE_API_KEY") {
            self.api.api_key = v;
        }
        if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
            self.api.port = port;
        }
    }
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, VitaeError> {
    let mut config = load_file(path)?;
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

fn load_file(path: &str) -> Result<Config, VitaeError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| VitaeError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| VitaeError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
