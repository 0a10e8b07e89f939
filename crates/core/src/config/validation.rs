//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `base_url` does not parse as an http(s) URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `install_concurrency` is 0 or exceeds 8
    /// - `user_agent` or `version` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base()?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ConfigError::Invalid {
                field: "base_url".into(),
                reason: format!("unsupported scheme '{}', expected http or https", base.scheme()),
            });
        }
        if base.host_str().is_none() {
            return Err(ConfigError::Invalid { field: "base_url".into(), reason: "must have a host".into() });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.install_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "install_concurrency".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.install_concurrency > 8 {
            return Err(ConfigError::Invalid {
                field: "install_concurrency".into(),
                reason: "must not exceed 8".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if let Some(version) = &self.version
            && version.is_empty()
        {
            return Err(ConfigError::Invalid { field: "version".into(), reason: "must not be empty".into() });
        }

        if base.scheme() == "http" && !matches!(base.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) {
            tracing::warn!(base_url = %self.base_url, "base_url uses plain http on a non-loopback host");
        }

        Ok(())
    }
}
