//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;

use crate::cache::Value;

/// Request body for PUT /stores/:store/keys/:key and POST .../add
///
/// # Fields
/// - `value`: The value to store
/// - `ttl`: Optional TTL in seconds (store default if not specified)
/// - `forever`: Store without expiry, `ttl` is ignored
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Never expire the entry
    #[serde(default)]
    pub forever: bool,
}

impl PutRequest {
    /// TTL as a Duration, if one was given.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl.map(Duration::from_secs)
    }
}

/// Request body for POST .../incr and .../decr
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CounterRequest {
    /// Amount to add or subtract (defaults to 1)
    #[serde(default)]
    pub delta: Option<i64>,
}

/// Request body for POST .../pull
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequest {
    /// Returned when the key has no valid entry
    #[serde(default)]
    pub default: Option<Value>,
}

/// Validates a key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > 256 {
        return Some("Key exceeds maximum length of 256 characters".to_string());
    }
    None
}
