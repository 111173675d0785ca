//! Wire formats shared by every endpoint.
//!
//! Timestamps leave the service as `%Y-%m-%dT%H:%M:%SZ` (second precision,
//! always UTC). Lower-bound query parameters are parsed as RFC3339. Binary
//! images travel as standard base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::ValidationError;
use crate::Timestamp;

/// Fixed date-time layout used in responses and client-supplied change dates.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Render a timestamp in the wire layout.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(WIRE_DATE_FORMAT).to_string()
}

/// Parse a timestamp in the wire layout, falling back to full RFC3339.
pub fn parse_timestamp(field: &str, value: &str) -> Result<Timestamp, ValidationError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, WIRE_DATE_FORMAT) {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    parse_rfc3339(field, value)
}

/// Parse an RFC3339 timestamp (the `dateFrom`/`createdAfter` style parameters).
pub fn parse_rfc3339(field: &str, value: &str) -> Result<Timestamp, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Parse an optional lower-bound parameter. Absent or empty means "from the beginning".
pub fn parse_lower_bound(field: &str, value: Option<&str>) -> Result<Option<Timestamp>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_rfc3339(field, v).map(Some),
    }
}

/// Parse an optional client-supplied timestamp in the wire layout.
///
/// Absent or empty means "use the server clock"; anything else must parse.
pub fn parse_optional_timestamp(field: &str, value: Option<&str>) -> Result<Option<Timestamp>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_timestamp(field, v).map(Some),
    }
}

/// Parse a transition flag. Only the literals `true` and `false` are accepted.
pub fn parse_flag(field: &str, value: Option<&str>) -> Result<bool, ValidationError> {
    match value {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        other => Err(ValidationError::InvalidBoolean {
            field: field.to_string(),
            value: other.unwrap_or_default().to_string(),
        }),
    }
}

/// Parse a generated numeric id from a path segment.
pub fn parse_id(value: &str) -> Result<i64, ValidationError> {
    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId {
            value: value.to_string(),
        }),
    }
}

/// Serde adapter for timestamps in the wire layout.
pub mod timestamp {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp("timestamp", &raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional client-supplied timestamps.
///
/// Missing, empty and unparseable values all deserialize to `None`; the
/// server substitutes its own clock in that case.
pub mod lenient_timestamp {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| parse_timestamp("timestamp", s.trim()).ok()))
    }
}

/// Serde adapter for base64 image payloads.
///
/// Undecodable input is stored as an empty image instead of failing the request.
pub mod image {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(STANDARD.decode(raw.as_bytes()).unwrap_or_default())
    }
}
