//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::Value;

/// Response body for GET /stores/:store/keys/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT /stores/:store/keys/:key
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl PutResponse {
    /// Creates a new PutResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for POST /stores/:store/keys/:key/add
#[derive(Debug, Clone, Serialize)]
pub struct AddResponse {
    pub key: String,
    /// Whether the value was written
    pub added: bool,
}

/// Response body for POST /stores/:store/keys/:key/pull
#[derive(Debug, Clone, Serialize)]
pub struct PullResponse {
    pub key: String,
    /// The removed value, or the request default
    pub value: Option<Value>,
}

/// Response body for POST .../incr and .../decr
#[derive(Debug, Clone, Serialize)]
pub struct CounterResponse {
    pub key: String,
    /// Counter value after the update
    pub count: i64,
}

/// Response body for DELETE /stores/:store/keys/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for DELETE /stores/:store
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub message: String,
    pub store: String,
}

impl FlushResponse {
    pub fn new(store: impl Into<String>) -> Self {
        let store = store.into();
        Self {
            message: format!("Store '{}' flushed", store),
            store,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Stores built so far
    pub stores: Vec<String>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(stores: Vec<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            stores,
        }
    }
}
