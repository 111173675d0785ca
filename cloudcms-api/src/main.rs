//! CloudCMS API Server Entry Point
//!
//! Bootstraps configuration, opens the document store and starts the Axum
//! HTTP server.

use std::sync::Arc;

use axum::Router;
use cloudcms_api::telemetry::init_tracing;
use cloudcms_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig};
use cloudcms_core::{CmsError, SystemClock};
use cloudcms_storage::{DocumentStore, InMemoryDocumentStore, InMemoryLatestCache, LmdbDocumentStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing()?;

    let api_config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env();
    let addr = api_config.bind_addr().map_err(CmsError::from)?;

    let store = open_store(&api_config)?;
    let cache = Arc::new(InMemoryLatestCache::with_capacity(api_config.cache_capacity));
    let state = AppState::new(store, cache, Arc::new(SystemClock), api_config);

    let app: Router = create_api_router(state, auth_config);

    tracing::info!(%addr, "Starting CloudCMS API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn open_store(config: &ApiConfig) -> ApiResult<Arc<dyn DocumentStore>> {
    match &config.store_path {
        Some(path) => {
            std::fs::create_dir_all(path).map_err(|e| {
                ApiError::internal_error(format!("Cannot create store directory {}: {}", path.display(), e))
            })?;
            let store = LmdbDocumentStore::open(path, config.store_max_mb).map_err(|e| {
                ApiError::internal_error(format!("Failed to open store at {}: {}", path.display(), e))
            })?;
            tracing::info!(path = %path.display(), max_mb = config.store_max_mb, "Opened LMDB document store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("CLOUDCMS_STORE_PATH not set, using in-memory store; data is lost on exit");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}
