//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_handler, decrement_handler, delete_handler, flush_handler, get_handler, health_handler,
    increment_handler, pull_handler, put_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET|PUT|DELETE /stores/:store/keys/:key` - Read, write, forget a key
/// - `POST /stores/:store/keys/:key/add` - Write only if absent
/// - `POST /stores/:store/keys/:key/pull` - Read and remove
/// - `POST /stores/:store/keys/:key/incr` - Increment a counter
/// - `POST /stores/:store/keys/:key/decr` - Decrement a counter
/// - `DELETE /stores/:store` - Flush a store
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/stores/:store/keys/:key",
            get(get_handler).put(put_handler).delete(delete_handler),
        )
        .route("/stores/:store/keys/:key/add", post(add_handler))
        .route("/stores/:store/keys/:key/pull", post(pull_handler))
        .route("/stores/:store/keys/:key/incr", post(increment_handler))
        .route("/stores/:store/keys/:key/decr", post(decrement_handler))
        .route("/stores/:store", delete(flush_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
