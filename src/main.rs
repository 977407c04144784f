//! Cachebox - HTTP front end for the named cache stores
//!
//! Serves the stores of a [`StoreFactory`] over a small REST API.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachebox::api::{create_router, AppState};
use cachebox::{ServerConfig, StoreFactory};

/// Main entry point for the Cachebox server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the store factory and register drivers
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachebox=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cachebox server");

    let config = ServerConfig::from_env();
    let cache_config = config
        .cache_config()
        .context("failed to load cache configuration")?;
    info!(
        "Configuration loaded: default_store={}, stores={}, port={}",
        cache_config.default,
        cache_config.stores.len(),
        config.server_port
    );

    let factory = StoreFactory::new(cache_config);
    register_remote_driver(&factory, &config)?;

    // Fail at startup rather than on the first request
    factory
        .try_store(&factory.config().default)
        .context("default cache store is misconfigured")?;

    let app = create_router(AppState::new(factory));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(feature = "redis")]
fn register_remote_driver(factory: &StoreFactory, config: &ServerConfig) -> anyhow::Result<()> {
    use std::collections::HashMap;
    use std::sync::Arc;

    use cachebox::cache::{remote_driver, RedisResolver, DEFAULT_CONNECTION, REMOTE_DRIVER};

    let Some(url) = &config.redis_url else {
        return Ok(());
    };
    let urls = HashMap::from([(DEFAULT_CONNECTION.to_string(), url.clone())]);
    let resolver = RedisResolver::new(urls).context("invalid REDIS_URL")?;
    factory.extend(REMOTE_DRIVER, remote_driver(Arc::new(resolver)));
    info!("Remote driver registered");
    Ok(())
}

#[cfg(not(feature = "redis"))]
fn register_remote_driver(_factory: &StoreFactory, config: &ServerConfig) -> anyhow::Result<()> {
    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL is set but the redis feature is disabled; ignoring");
    }
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
