//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `GET|PUT|DELETE /stores/:store/keys/:key` - Read, write, forget a key
//! - `POST /stores/:store/keys/:key/{add,pull,incr,decr}` - Conditional and counter operations
//! - `DELETE /stores/:store` - Flush a store
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
