//! Configuration validation rules.
//!
//! Applied to `AppConfig` values after they have been loaded from
//! environment, files, or defaults.

use std::net::SocketAddr;

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

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.posts_per_page) {
            return Err(invalid("posts_per_page", "must be between 1 and 100"));
        }

        if !(1..=100).contains(&self.cache_limit) {
            return Err(invalid("cache_limit", "must be between 1 and 100"));
        }

        if self.cache_ttl_ms == 0 {
            return Err(invalid("cache_ttl_ms", "must be greater than 0"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.bind.parse::<SocketAddr>().is_err() {
            return Err(invalid("bind", "must be a socket address such as 127.0.0.1:8080"));
        }

        if let Some(secret) = &self.nonce_secret
            && secret.len() < 16
        {
            return Err(invalid("nonce_secret", "must be at least 16 bytes"));
        }

        if self.nonce_secret.is_none() {
            tracing::debug!("nonce_secret not set; anti-forgery verification will be disabled");
        }

        Ok(())
    }
}
