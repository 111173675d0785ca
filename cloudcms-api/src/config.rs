//! API Configuration Module
//!
//! Server, CORS, storage and request-origin settings. Configuration is
//! loaded from environment variables with sensible defaults for
//! development. The shared secret is configured separately in
//! [`crate::auth::AuthConfig`].

use std::net::SocketAddr;
use std::path::PathBuf;

use cloudcms_core::ConfigError;

use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_CACHE_CAPACITY, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_GEO_HEADER_CITY,
    DEFAULT_GEO_HEADER_CITY_LATLONG, DEFAULT_GEO_HEADER_COUNTRY, DEFAULT_GEO_HEADER_REGION,
    DEFAULT_PORT, DEFAULT_STORE_MAX_MB,
};

// ============================================================================
// REQUEST ORIGIN HEADERS
// ============================================================================

/// Names of the headers a fronting proxy fills with the client's location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoHeaderNames {
    pub country: String,
    pub region: String,
    pub city: String,
    pub city_lat_long: String,
}

impl Default for GeoHeaderNames {
    fn default() -> Self {
        Self {
            country: DEFAULT_GEO_HEADER_COUNTRY.to_string(),
            region: DEFAULT_GEO_HEADER_REGION.to_string(),
            city: DEFAULT_GEO_HEADER_CITY.to_string(),
            city_lat_long: DEFAULT_GEO_HEADER_CITY_LATLONG.to_string(),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    pub bind_host: String,

    /// Raw port value, validated by [`ApiConfig::bind_addr`].
    pub port: String,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Storage
    // ========================================================================
    /// LMDB directory. `None` selects the in-memory store.
    pub store_path: Option<PathBuf>,

    /// LMDB map size; writes beyond it fail as over quota.
    pub store_max_mb: usize,

    /// Maximum cached latest values (0 = unbounded).
    pub cache_capacity: usize,

    pub geo_headers: GeoHeaderNames,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            store_path: None,
            store_max_mb: DEFAULT_STORE_MAX_MB,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            geo_headers: GeoHeaderNames::default(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CLOUDCMS_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `CLOUDCMS_API_PORT`: Listen port (default: 8080)
    /// - `CLOUDCMS_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `CLOUDCMS_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `CLOUDCMS_STORE_PATH`: LMDB directory (unset = in-memory store)
    /// - `CLOUDCMS_STORE_MAX_MB`: LMDB map size (default: 1024)
    /// - `CLOUDCMS_CACHE_CAPACITY`: Latest-value cache entries (default: 1024)
    /// - `CLOUDCMS_GEO_HEADER_{COUNTRY,REGION,CITY,CITY_LATLONG}`: origin header names
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origins = std::env::var("CLOUDCMS_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("CLOUDCMS_API_PORT").ok())
            .unwrap_or(defaults.port);

        let geo_defaults = defaults.geo_headers;
        let geo_headers = GeoHeaderNames {
            country: env_or("CLOUDCMS_GEO_HEADER_COUNTRY", &geo_defaults.country),
            region: env_or("CLOUDCMS_GEO_HEADER_REGION", &geo_defaults.region),
            city: env_or("CLOUDCMS_GEO_HEADER_CITY", &geo_defaults.city),
            city_lat_long: env_or("CLOUDCMS_GEO_HEADER_CITY_LATLONG", &geo_defaults.city_lat_long),
        };

        Self {
            bind_host: env_or("CLOUDCMS_API_BIND", &defaults.bind_host),
            port,
            cors_origins,
            cors_max_age_secs: std::env::var("CLOUDCMS_CORS_MAX_AGE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cors_max_age_secs),
            store_path: std::env::var("CLOUDCMS_STORE_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            store_max_mb: std::env::var("CLOUDCMS_STORE_MAX_MB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.store_max_mb),
            cache_capacity: std::env::var("CLOUDCMS_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cache_capacity),
            geo_headers,
        }
    }

    /// Resolve the listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let port = self.port.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
            field: "port".to_string(),
            value: self.port.clone(),
            reason: "expected a TCP port number".to_string(),
        })?;

        let addr = format!("{}:{}", self.bind_host, port);
        addr.parse::<SocketAddr>().map_err(|e| ConfigError::InvalidValue {
            field: "bind".to_string(),
            value: addr.clone(),
            reason: e.to_string(),
        })
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|allowed| allowed == origin)
    }
}
