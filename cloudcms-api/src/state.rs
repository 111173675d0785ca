//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use cloudcms_core::{Clock, SystemClock};
use cloudcms_storage::{DocumentStore, InMemoryDocumentStore, InMemoryLatestCache, LatestValueCache};

use crate::config::ApiConfig;

/// Application-wide state shared across all routes.
///
/// Holds no per-request data. The store and cache are the only places
/// "current" state lives.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub cache: Arc<dyn LatestValueCache>,
    /// Source of every server-stamped timestamp.
    pub clock: Arc<dyn Clock>,
    pub config: Arc<ApiConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn LatestValueCache>,
        clock: Arc<dyn Clock>,
        config: ApiConfig,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// In-memory store and cache with the system clock.
    pub fn in_memory(config: ApiConfig) -> Self {
        let cache = InMemoryLatestCache::with_capacity(config.cache_capacity);
        Self::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(cache),
            Arc::new(SystemClock),
            config,
        )
    }
}
