//! Configuration Module
//!
//! Named store configuration for the factory plus server settings loaded
//! from environment variables.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Default TTL in seconds applied to counters when a store config omits `ttl`.
pub const DEFAULT_STORE_TTL: u64 = 24 * 60 * 60;

/// Name of the store used when none is configured.
pub const DEFAULT_STORE_NAME: &str = "memory";

/// Configuration of a single named store.
///
/// Driver-specific fields that are not modelled here land in `extra`
/// and are passed through to the driver constructor untouched.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Driver kind, used as the key into the registered constructors
    pub driver: String,
    /// Default TTL in seconds, used for counters
    #[serde(default = "default_ttl")]
    pub ttl: u64,
    /// Namespace prefix for keys
    #[serde(default)]
    pub prefix: String,
    /// Remote connection name, only meaningful for remote drivers
    #[serde(default)]
    pub connection: Option<String>,
    /// Any other driver-specific settings
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_ttl() -> u64 {
    DEFAULT_STORE_TTL
}

impl StoreConfig {
    /// Creates a config for the given driver with default TTL and no prefix.
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ttl: DEFAULT_STORE_TTL,
            prefix: String::new(),
            connection: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Sets the default TTL in seconds.
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the remote connection name.
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    /// Default TTL as a Duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }

    /// Reads a driver-specific string field.
    pub fn extra_str(&self, field: &str) -> Option<&str> {
        self.extra.get(field).and_then(|v| v.as_str())
    }
}

/// Configuration for the store factory: which store is the default and
/// how each named store is built.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Store name resolved when callers don't ask for one
    #[serde(default = "default_store_name")]
    pub default: String,
    /// Per-name store settings
    #[serde(default)]
    pub stores: HashMap<String, StoreConfig>,
}

fn default_store_name() -> String {
    DEFAULT_STORE_NAME.to_string()
}

impl CacheConfig {
    /// Creates an empty configuration with the given default store name.
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            stores: HashMap::new(),
        }
    }

    /// Adds (or replaces) a named store.
    pub fn with_store(mut self, name: impl Into<String>, store: StoreConfig) -> Self {
        self.stores.insert(name.into(), store);
        self
    }

    /// Parses a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| CacheError::Config(e.to_string()))
    }

    /// Looks up the settings for a named store.
    pub fn store(&self, name: &str) -> Option<&StoreConfig> {
        self.stores.get(name)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_NAME).with_store(DEFAULT_STORE_NAME, StoreConfig::new("memory"))
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub server_port: u16,
    /// Optional path to a JSON cache configuration
    pub cache_config_path: Option<String>,
    /// Default TTL in seconds for the fallback memory store
    pub default_ttl: u64,
    /// Key prefix for the fallback memory store
    pub prefix: String,
    /// URL of the default remote connection, if any
    pub redis_url: Option<String>,
}

impl ServerConfig {
    /// Creates a new ServerConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_CONFIG` - Path to a JSON cache configuration (optional)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 86400)
    /// - `CACHE_PREFIX` - Key prefix (default: empty)
    /// - `REDIS_URL` - Default remote connection (optional, used with the `redis` feature)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cache_config_path: env::var("CACHE_CONFIG").ok().filter(|v| !v.is_empty()),
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_STORE_TTL),
            prefix: env::var("CACHE_PREFIX").unwrap_or_default(),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
        }
    }

    /// Builds the cache configuration: the JSON file when one is set,
    /// otherwise a single memory store from the environment settings.
    pub fn cache_config(&self) -> Result<CacheConfig> {
        match &self.cache_config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| CacheError::Config(format!("{}: {}", path, e)))?;
                CacheConfig::from_json(&raw)
            }
            None => Ok(CacheConfig::new(DEFAULT_STORE_NAME).with_store(
                DEFAULT_STORE_NAME,
                StoreConfig::new("memory")
                    .with_ttl(self.default_ttl)
                    .with_prefix(self.prefix.clone()),
            )),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_config_path: None,
            default_ttl: DEFAULT_STORE_TTL,
            prefix: String::new(),
            redis_url: None,
        }
    }
}
