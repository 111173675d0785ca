//! Per-client usage telemetry.
//!
//! The only entity addressed by a caller-supplied natural key (`userKey`).
//! Writes are merges: geo fields and `createDate` are fixed by the first
//! upsert, `useCount` accumulates, the remaining fields follow the latest
//! request.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::wire;
use crate::Timestamp;

pub const TELEMETRY_ENTITY_KIND: &str = "telemetryentity";
pub const TELEMETRY_ROOT_KEY: &str = "telemetryroot";

pub const CREATE_DATE_FIELD: &str = "createDate";
pub const LAST_CHANGE_FIELD: &str = "lastChange";
pub const OPERATING_SYSTEM_FIELD: &str = "operatingSystem";
pub const CLIENT_VERSION_FIELD: &str = "clientVersion";

/// Increment applied when the caller omits one.
pub const DEFAULT_INCREMENT: i64 = 1;

/// Location of the request as reported by the fronting proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoOrigin {
    pub country: String,
    pub region: String,
    pub city: String,
    pub city_lat_long: String,
}

/// Stored telemetry document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryRecord {
    pub country: String,
    pub region: String,
    pub city: String,
    pub city_lat_long: String,
    pub create_date: Timestamp,
    pub last_change: Timestamp,
    pub use_count: i64,
    pub operating_system: String,
    pub client_version: String,
}

/// Upsert request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryUpsert {
    #[serde(alias = "key")]
    pub user_key: String,
    /// Defaults to 1; must not be negative.
    pub increment: Option<i64>,
    pub operating_system: String,
    pub client_version: String,
}

impl TelemetryUpsert {
    /// Validated key and increment.
    pub fn validate(&self) -> Result<(&str, i64), ValidationError> {
        let key = self.user_key.trim();
        if key.is_empty() {
            return Err(ValidationError::MissingId {
                operation: "Telemetry".to_string(),
            });
        }
        let increment = self.increment.unwrap_or(DEFAULT_INCREMENT);
        if increment < 0 {
            return Err(ValidationError::InvalidIncrement { value: increment });
        }
        Ok((key, increment))
    }
}

/// Merge one upsert into the stored record, creating it when absent.
pub fn merge(
    existing: Option<TelemetryRecord>,
    upsert: &TelemetryUpsert,
    origin: &GeoOrigin,
    now: Timestamp,
) -> Result<TelemetryRecord, ValidationError> {
    let (_, increment) = upsert.validate()?;

    let mut record = existing.unwrap_or_else(|| TelemetryRecord {
        country: origin.country.clone(),
        region: origin.region.clone(),
        city: origin.city.clone(),
        city_lat_long: origin.city_lat_long.clone(),
        create_date: now,
        use_count: 0,
        ..Default::default()
    });

    record.use_count = record.use_count.saturating_add(increment);
    record.last_change = now;
    record.operating_system = upsert.operating_system.clone();
    record.client_version = upsert.client_version.clone();
    Ok(record)
}

/// Telemetry as listed to clients. The user key is not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TelemetryView {
    pub country: String,
    pub region: String,
    pub city: String,
    pub city_lat_long: String,
    #[serde(with = "wire::timestamp")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub create_date: Timestamp,
    #[serde(with = "wire::timestamp")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub last_change: Timestamp,
    pub use_count: i64,
    pub operating_system: String,
    pub client_version: String,
}

impl From<TelemetryRecord> for TelemetryView {
    fn from(record: TelemetryRecord) -> Self {
        Self {
            country: record.country,
            region: record.region,
            city: record.city,
            city_lat_long: record.city_lat_long,
            create_date: record.create_date,
            last_change: record.last_change,
            use_count: record.use_count,
            operating_system: record.operating_system,
            client_version: record.client_version,
        }
    }
}

// ============================================================================
// LIST FILTER
// ============================================================================

/// The single filter dimension applied to a telemetry listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryFilter {
    CreatedAfter(Timestamp),
    UpdatedAfter(Timestamp),
    OperatingSystem(String),
    ClientVersion(String),
    All,
}

/// Raw list query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryListParams {
    pub created_after: Option<String>,
    pub updated_after: Option<String>,
    pub os: Option<String>,
    pub version: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl TelemetryListParams {
    /// Pick the filter by fixed precedence: `createdAfter`, `updatedAfter`,
    /// `os`, `version`. Lower-precedence parameters are ignored and never
    /// parsed. Empty values count as absent.
    pub fn select(&self) -> Result<TelemetryFilter, ValidationError> {
        if let Some(v) = present(&self.created_after) {
            return wire::parse_rfc3339("createdAfter", v).map(TelemetryFilter::CreatedAfter);
        }
        if let Some(v) = present(&self.updated_after) {
            return wire::parse_rfc3339("updatedAfter", v).map(TelemetryFilter::UpdatedAfter);
        }
        if let Some(v) = present(&self.os) {
            return Ok(TelemetryFilter::OperatingSystem(v.to_string()));
        }
        if let Some(v) = present(&self.version) {
            return Ok(TelemetryFilter::ClientVersion(v.to_string()));
        }
        Ok(TelemetryFilter::All)
    }
}
