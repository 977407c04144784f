//! Error types for the cache stores
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache stores, the factory and the HTTP layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Key not found in the store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Store name has no configuration entry
    #[error("Unknown cache store: {0}")]
    UnknownStore(String),

    /// Driver kind has no registered constructor
    #[error("Unsupported cache driver: {0}")]
    UnknownDriver(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failure reported by a remote key/value connection
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Returns true for configuration errors, which are deployment bugs
    /// rather than runtime conditions.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CacheError::UnknownStore(_) | CacheError::UnknownDriver(_) | CacheError::Config(_)
        )
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) | CacheError::UnknownStore(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Remote(_) => StatusCode::BAD_GATEWAY,
            CacheError::UnknownDriver(_) | CacheError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert!(CacheError::UnknownDriver("file".into()).is_configuration());
        assert!(CacheError::UnknownStore("sessions".into()).is_configuration());
        assert!(!CacheError::NotFound("k".into()).is_configuration());
        assert!(!CacheError::Remote("timeout".into()).is_configuration());
    }

    #[test]
    fn test_status_mapping() {
        let response = CacheError::NotFound("k".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = CacheError::Remote("down".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = CacheError::InvalidRequest("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
