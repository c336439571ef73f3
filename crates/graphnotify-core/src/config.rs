//! Configuration module for graphnotify.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, defaults, and builder-style overrides for tests and
//! programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for graphnotify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// App host name the notification feed is registered under.
    pub app_host_name: String,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// OAuth application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// MSA application (client) id. `None` until the app is registered.
    pub msa_client_id: Option<String>,
    /// AAD application (client) id.
    pub aad_client_id: Option<String>,
    /// Redirect URI registered for the AAD application.
    pub aad_redirect_uri: Option<String>,
}

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON file holding the serialized account list.
    pub accounts_path: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_host_name: String::new(),
            auth: AuthConfig::default(),
            storage: StorageConfig {
                accounts_path: PathBuf::from("accounts.json"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Sets the app host name.
    pub fn with_app_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.app_host_name = host_name.into();
        self
    }

    /// Sets the account list path.
    pub fn with_accounts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.accounts_path = path.into();
        self
    }
}
