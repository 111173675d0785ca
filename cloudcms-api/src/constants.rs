//! Constants for CloudCMS API
//!
//! Centralizing constants makes them easy to find, modify, and test. Wire
//! level constants of the data model live in `cloudcms-core`.

// ============================================================================
// AUTHENTICATION
// ============================================================================

/// Environment variable holding the shared secret.
pub const BASIC_AUTH_ENV: &str = "CLOUDCMS_BASIC_AUTH";

/// Scheme prefix the shared secret is compared with.
pub const BASIC_AUTH_PREFIX: &str = "Basic ";

/// Challenge sent with every auth failure.
pub const WWW_AUTHENTICATE_CHALLENGE: &str = "Basic realm=Protected Area";

// ============================================================================
// ERRORS
// ============================================================================

/// Message returned when the store reports exhausted capacity.
pub const OVER_QUOTA_MESSAGE: &str = "503 - Over Quota";

// ============================================================================
// SERVER
// ============================================================================

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

/// API version prefix of every protected route.
pub const API_PREFIX: &str = "/v1";

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// STORAGE
// ============================================================================

/// Default LMDB map size in megabytes.
pub const DEFAULT_STORE_MAX_MB: usize = 1024;

/// Default latest-value cache capacity (0 = unbounded).
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

// ============================================================================
// REQUEST ORIGIN HEADERS
// ============================================================================

pub const DEFAULT_GEO_HEADER_COUNTRY: &str = "x-appengine-country";
pub const DEFAULT_GEO_HEADER_REGION: &str = "x-appengine-region";
pub const DEFAULT_GEO_HEADER_CITY: &str = "x-appengine-city";
pub const DEFAULT_GEO_HEADER_CITY_LATLONG: &str = "x-appengine-citylatlong";

// ============================================================================
// QUERY PARAMETERS
// ============================================================================

pub const DATE_FROM_PARAM: &str = "dateFrom";
pub const NEW_STATUS_PARAM: &str = "newStatus";
