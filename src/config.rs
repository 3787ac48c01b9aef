//! Configuration management for the grammar checker
//!
//! Handles loading and parsing of `grammar-checker.toml`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::theme::Theme;

/// Configuration file name looked up in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "grammar-checker.toml";

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream chat-completion provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Correction proxy settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Client view settings
    #[serde(default)]
    pub client: ClientConfig,
}

/// Chat-completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (can also be set via `OPENAI_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (for compatible endpoints)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum tokens for response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Correction proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the proxy listens on
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Route of the correction endpoint
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,

    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            endpoint_path: default_endpoint_path(),
            body_limit: default_body_limit(),
        }
    }
}

/// Client view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Full URL of the correction endpoint
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Delay between two revealed characters
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default)]
    pub locale: Locale,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            reveal_delay_ms: default_reveal_delay_ms(),
            theme: Theme::default(),
            locale: Locale::default(),
        }
    }
}

impl ClientConfig {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_max_tokens() -> u32 {
    3000
}

fn default_temperature() -> f32 {
    1.0
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_endpoint_path() -> String {
    "/api/endpoint".to_string()
}

fn default_body_limit() -> usize {
    1024 * 1024
}

fn default_endpoint_url() -> String {
    "http://127.0.0.1:3000/api/endpoint".to_string()
}

fn default_reveal_delay_ms() -> u64 {
    50
}

impl Config {
    /// Load configuration from file, or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "grammar-checker")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the working directory or the user config dir
    pub fn load_from_default() -> Self {
        let workspace_path = PathBuf::from(CONFIG_FILE_NAME);
        if workspace_path.exists() {
            match Self::load(&workspace_path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("{}", e),
            }
        }

        if let Some(default_path) = Self::default_path() {
            match Self::load(&default_path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("{}", e),
            }
        }

        Config::default()
    }

    /// Get the effective API key (from config or environment)
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.provider.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty())
    }
}
