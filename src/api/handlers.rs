//! API Handlers
//!
//! HTTP request handlers exposing the factory's named stores.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{Store, StoreFactory};
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, AddResponse, CounterRequest, CounterResponse, DeleteResponse, FlushResponse,
    GetResponse, HealthResponse, PullRequest, PullResponse, PutRequest, PutResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store factory resolving names from the request path
    pub factory: Arc<StoreFactory>,
}

impl AppState {
    /// Creates a new AppState around the given factory.
    pub fn new(factory: StoreFactory) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Resolves a store without panicking on misconfiguration.
    fn store(&self, name: &str) -> Result<Arc<dyn Store>> {
        self.factory.try_store(name)
    }

    /// Default TTL configured for the named store.
    fn default_ttl(&self, name: &str) -> Result<Duration> {
        self.factory
            .config()
            .store(name)
            .map(|config| config.default_ttl())
            .ok_or_else(|| CacheError::UnknownStore(name.to_string()))
    }
}

fn check_key(key: &str) -> Result<()> {
    match validate_key(key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(()),
    }
}

/// Handler for GET /stores/:store/keys/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path((store, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let value = state
        .store(&store)?
        .get(&key)?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for PUT /stores/:store/keys/:key
///
/// Writes with the request TTL, the store's default TTL, or no expiry
/// when `forever` is set.
pub async fn put_handler(
    State(state): State<AppState>,
    Path((store, key)): Path<(String, String)>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    check_key(&key)?;
    let cache = state.store(&store)?;

    if req.forever {
        cache.forever(&key, req.value)?;
    } else {
        let ttl = match req.ttl() {
            Some(ttl) => ttl,
            None => state.default_ttl(&store)?,
        };
        cache.put(&key, req.value, ttl)?;
    }

    Ok(Json(PutResponse::new(key)))
}

/// Handler for POST /stores/:store/keys/:key/add
pub async fn add_handler(
    State(state): State<AppState>,
    Path((store, key)): Path<(String, String)>,
    Json(req): Json<PutRequest>,
) -> Result<Json<AddResponse>> {
    check_key(&key)?;
    let ttl = req.ttl();
    let added = state.store(&store)?.add(&key, req.value, ttl)?;

    Ok(Json(AddResponse { key, added }))
}

/// Handler for POST /stores/:store/keys/:key/pull
pub async fn pull_handler(
    State(state): State<AppState>,
    Path((store, key)): Path<(String, String)>,
    req: Option<Json<PullRequest>>,
) -> Result<Json<PullResponse>> {
    let default = req.and_then(|Json(req)| req.default);
    let value = state.store(&store)?.pull(&key, default)?;

    Ok(Json(PullResponse { key, value }))
}

/// Handler for POST /stores/:store/keys/:key/incr
pub async fn increment_handler(
    State(state): State<AppState>,
    Path((store, key)): Path<(String, String)>,
    req: Option<Json<CounterRequest>>,
) -> Result<Json<CounterResponse>> {
    check_key(&key)?;
    let delta = req.and_then(|Json(req)| req.delta);
    let count = state.store(&store)?.increment(&key, delta)?;

    Ok(Json(CounterResponse { key, count }))
}

/// Handler for POST /stores/:store/keys/:key/decr
pub async fn decrement_handler(
    State(state): State<AppState>,
    Path((store, key)): Path<(String, String)>,
    req: Option<Json<CounterRequest>>,
) -> Result<Json<CounterResponse>> {
    check_key(&key)?;
    let delta = req.and_then(|Json(req)| req.delta);
    let count = state.store(&store)?.decrement(&key, delta)?;

    Ok(Json(CounterResponse { key, count }))
}

/// Handler for DELETE /stores/:store/keys/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((store, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    state.store(&store)?.forget(&key)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /stores/:store
pub async fn flush_handler(
    State(state): State<AppState>,
    Path(store): Path<String>,
) -> Result<Json<FlushResponse>> {
    state.store(&store)?.flush()?;

    Ok(Json(FlushResponse::new(store)))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.factory.store_names()))
}
