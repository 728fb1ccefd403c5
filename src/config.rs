//! Configuration management for querydesk.
//!
//! Handles loading application settings from a TOML file and resolving the
//! query API base URL from CLI flags, environment variables, and the file.

use crate::api::client::{ApiClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{QueryDeskError, Result};
use crate::persistence::DataDir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the query API base URL.
pub const API_URL_ENV: &str = "VITE_API_URL";

/// Main settings structure for querydesk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    /// Query API settings.
    #[serde(default)]
    pub api: ApiSettings,

    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Query API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiSettings {
    /// Base URL of the query API. Environment and CLI take precedence.
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiSettings {
    /// Resolves the client config, reading the environment for overrides.
    ///
    /// Precedence: CLI flag, then `VITE_API_URL`, then the settings file,
    /// then the production default.
    pub fn resolve(&self, cli_override: Option<&str>) -> Result<ApiClientConfig> {
        self.resolve_with_env(cli_override, std::env::var(API_URL_ENV).ok())
    }

    /// Resolves the client config with an explicit environment value.
    pub fn resolve_with_env(
        &self,
        cli_override: Option<&str>,
        env_value: Option<String>,
    ) -> Result<ApiClientConfig> {
        let base_url = cli_override
            .map(String::from)
            .or(env_value.filter(|v| !v.trim().is_empty()))
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if self.timeout_secs == 0 {
            return Err(QueryDeskError::config(
                "api.timeout_secs must be greater than zero",
            ));
        }

        Ok(ApiClientConfig::new(base_url).with_timeout(self.timeout_secs))
    }
}

/// Local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StorageSettings {
    /// Directory for the JSON store files.
    pub data_dir: Option<PathBuf>,
}

impl StorageSettings {
    /// Resolves the data directory: CLI flag, settings file, platform default.
    pub fn resolve(&self, cli_override: Option<&Path>) -> Result<DataDir> {
        match cli_override.or(self.data_dir.as_deref()) {
            Some(dir) => Ok(DataDir::new(dir)),
            None => DataDir::default_dir(),
        }
    }
}

impl Settings {
    /// Returns the default settings file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("querydesk")
            .join("config.toml")
    }

    /// Loads settings from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| QueryDeskError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses settings from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            QueryDeskError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
