//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LARDER_*)
//! 2. TOML config file (if LARDER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LARDER_*)
/// 2. TOML config file (if LARDER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    ///
    /// Set via LARDER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the site is served from; manifest paths resolve against it.
    ///
    /// Set via LARDER_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deploy version token override.
    ///
    /// When unset, the built-in version baked into the worker is used.
    /// Set via LARDER_VERSION environment variable.
    #[serde(default)]
    pub version: Option<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via LARDER_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via LARDER_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via LARDER_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Parallel downloads during install.
    ///
    /// Set via LARDER_INSTALL_CONCURRENCY environment variable.
    #[serde(default = "default_install_concurrency")]
    pub install_concurrency: usize,
}

fn default_db_path() -> PathBuf {
    dirs::cache_dir().map(|dir| dir.join("larder")).unwrap_or_else(|| PathBuf::from(".")).join("cache.sqlite3")
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/".into()
}

fn default_user_agent() -> String {
    "larder/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_install_concurrency() -> usize {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            base_url: default_base_url(),
            version: None,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            install_concurrency: default_install_concurrency(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed base URL for resolving site-relative paths.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `base_url` does not parse.
    pub fn base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid { field: "base_url".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LARDER_`
    /// 2. TOML file from `LARDER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("LARDER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("LARDER_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
