//! Operational status log and the admission decision derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{AppendOnlyRecord, CHANGE_DATE_FIELD};
use crate::wire;
use crate::Timestamp;

/// Reason text returned with every admission rejection.
pub const GATE_CLOSED_REASON: &str =
    "CloudDB is currently not available - status does not allow processing of requests";

/// System-wide operational status. Travels as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum OperationalStatus {
    Ok,
    PartialFailure,
    Outage,
}

impl OperationalStatus {
    pub fn code(&self) -> i64 {
        match self {
            OperationalStatus::Ok => 10,
            OperationalStatus::PartialFailure => 20,
            OperationalStatus::Outage => 30,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            10 => Ok(OperationalStatus::Ok),
            20 => Ok(OperationalStatus::PartialFailure),
            30 => Ok(OperationalStatus::Outage),
            other => Err(ValidationError::InvalidValue {
                field: "status".to_string(),
                reason: format!("unknown status code {other}, expected 10, 20 or 30"),
            }),
        }
    }
}

impl TryFrom<i64> for OperationalStatus {
    type Error = ValidationError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<OperationalStatus> for i64 {
    fn from(status: OperationalStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationalStatus::Ok => f.write_str("OK"),
            OperationalStatus::PartialFailure => f.write_str("PARTIAL_FAILURE"),
            OperationalStatus::Outage => f.write_str("OUTAGE"),
        }
    }
}

// ============================================================================
// ADMISSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Deny,
}

/// Decide admission from the resolved current status.
///
/// `None` covers both "no status recorded" and "status could not be
/// resolved"; both fail open.
pub fn admit(current: Option<OperationalStatus>) -> Admission {
    match current {
        None | Some(OperationalStatus::Ok) => Admission::Allow,
        Some(_) => Admission::Deny,
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// Stored status log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub status: OperationalStatus,
    pub change_date: Timestamp,
}

/// Create request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct NewStatus {
    /// 10 = OK, 20 = PARTIAL_FAILURE, 30 = OUTAGE
    pub status: i64,
    /// Optional, wire layout; the server clock is used when absent.
    pub change_date: Option<String>,
    /// Optional explanation stored as a child record.
    pub text: String,
}

impl NewStatus {
    pub fn into_record(self, now: Timestamp) -> Result<(StatusRecord, Option<String>), ValidationError> {
        let status = OperationalStatus::from_code(self.status)?;
        let change_date = wire::parse_optional_timestamp(CHANGE_DATE_FIELD, self.change_date.as_deref())?;
        let record = StatusRecord {
            status,
            change_date: change_date.unwrap_or(now),
        };
        let text = Some(self.text).filter(|t| !t.is_empty());
        Ok((record, text))
    }
}

/// Status as returned to clients and cached as the latest pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub id: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = i64))]
    pub status: OperationalStatus,
    #[serde(with = "wire::timestamp")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub change_date: Timestamp,
}

impl AppendOnlyRecord for StatusRecord {
    type View = StatusView;

    const ENTITY_KIND: &'static str = "statusentity";
    const ROOT_KEY: &'static str = "statusroot";
    const TEXT_KIND: &'static str = "statusText";
    const CACHE_KEY: &'static str = "currentstatus";

    fn view(&self, id: i64) -> StatusView {
        StatusView {
            id,
            status: self.status,
            change_date: self.change_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            OperationalStatus::Ok,
            OperationalStatus::PartialFailure,
            OperationalStatus::Outage,
        ] {
            assert_eq!(OperationalStatus::from_code(status.code()), Ok(status));
        }
        assert!(OperationalStatus::from_code(15).is_err());
    }

    #[test]
    fn test_admission_fails_open() {
        assert_eq!(admit(None), Admission::Allow);
        assert_eq!(admit(Some(OperationalStatus::Ok)), Admission::Allow);
        assert_eq!(admit(Some(OperationalStatus::PartialFailure)), Admission::Deny);
        assert_eq!(admit(Some(OperationalStatus::Outage)), Admission::Deny);
    }

    #[test]
    fn test_new_status_defaults_change_date_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 3, 3, 3, 3).unwrap();
        let (record, text) = NewStatus {
            status: 30,
            change_date: None,
            text: String::new(),
        }
        .into_record(now)
        .unwrap();
        assert_eq!(record.change_date, now);
        assert_eq!(record.status, OperationalStatus::Outage);
        assert!(text.is_none());
    }

    #[test]
    fn test_new_status_rejects_unknown_code() {
        let result = NewStatus {
            status: 99,
            ..Default::default()
        }
        .into_record(Utc::now());
        assert!(matches!(result, Err(ValidationError::InvalidValue { .. })));
    }

    #[test]
    fn test_view_wire_shape() {
        let at = Utc.with_ymd_and_hms(2017, 1, 2, 3, 4, 5).unwrap();
        let view = StatusRecord {
            status: OperationalStatus::PartialFailure,
            change_date: at,
        }
        .view(11);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], 20);
        assert_eq!(json["changeDate"], "2017-01-02T03:04:05Z");
        let back: StatusView = serde_json::from_value(json).unwrap();
        assert_eq!(back, view);
    }

    #[test]
    fn test_client_change_date_in_wire_layout() {
        let body: NewStatus =
            serde_json::from_str(r#"{"status":10,"changeDate":"2019-09-09T09:09:09Z","text":"ok"}"#)
                .unwrap();
        let (record, _) = body.into_record(Utc::now()).unwrap();
        assert_eq!(record.change_date, Utc.with_ymd_and_hms(2019, 9, 9, 9, 9, 9).unwrap());
    }

    #[test]
    fn test_malformed_change_date_is_rejected() {
        let body: NewStatus = serde_json::from_str(r#"{"status":30,"changeDate":"not-a-date"}"#).unwrap();
        assert!(matches!(
            body.into_record(Utc::now()),
            Err(ValidationError::InvalidTimestamp { .. })
        ));
    }
}
