//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from, in increasing precedence:
//!
//! 1. Built-in defaults
//! 2. TOML config file (if FEEDLINE_CONFIG_FILE set)
//! 3. Environment variables (FEEDLINE_*)

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Default lifetime of a persisted page entry (6 hours).
pub const DEFAULT_CACHE_TTL_MS: u64 = 6 * 60 * 60 * 1000;

/// Default number of pages kept per persisted bucket.
pub const DEFAULT_CACHE_LIMIT: usize = 6;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding posts and persisted buckets.
    ///
    /// Set via FEEDLINE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Socket address the server binds to.
    ///
    /// Set via FEEDLINE_BIND environment variable.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Site-wide default page size, used when a request omits one.
    ///
    /// Set via FEEDLINE_POSTS_PER_PAGE environment variable.
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: u32,

    /// Secret for anti-forgery tokens. Verification is disabled when unset.
    ///
    /// Set via FEEDLINE_NONCE_SECRET environment variable.
    #[serde(default)]
    pub nonce_secret: Option<String>,

    /// Entry lifetime advertised to loaders in `data-cache-ttl`.
    ///
    /// Set via FEEDLINE_CACHE_TTL_MS environment variable.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Bucket capacity advertised to loaders in `data-cache-limit`.
    ///
    /// Set via FEEDLINE_CACHE_LIMIT environment variable.
    #[serde(default = "default_cache_limit")]
    pub cache_limit: usize,

    /// User-Agent string for loader HTTP requests.
    ///
    /// Set via FEEDLINE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Loader HTTP request timeout in milliseconds.
    ///
    /// Set via FEEDLINE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum feed page body size accepted by the loader.
    ///
    /// Set via FEEDLINE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./feedline.sqlite")
}

fn default_bind() -> String {
    "127.0.0.1:8080".into()
}

fn default_posts_per_page() -> u32 {
    10
}

fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

fn default_cache_limit() -> usize {
    DEFAULT_CACHE_LIMIT
}

fn default_user_agent() -> String {
    "feedline/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    2 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind: default_bind(),
            posts_per_page: default_posts_per_page(),
            nonce_secret: None,
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_limit: default_cache_limit(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Persisted entry lifetime as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration file cannot be read, an
    /// environment variable cannot be parsed, or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered figment used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FEEDLINE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("FEEDLINE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
