//! Client release announcements.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{AppendOnlyRecord, CHANGE_DATE_FIELD};
use crate::wire;
use crate::Timestamp;

/// Stored field holding the integer version.
pub const VERSION_FIELD: &str = "version";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ReleaseType {
    Release,
    ReleaseCandidate,
    Development,
}

impl ReleaseType {
    pub fn code(&self) -> i64 {
        match self {
            ReleaseType::Release => 10,
            ReleaseType::ReleaseCandidate => 20,
            ReleaseType::Development => 30,
        }
    }
}

impl TryFrom<i64> for ReleaseType {
    type Error = ValidationError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            10 => Ok(ReleaseType::Release),
            20 => Ok(ReleaseType::ReleaseCandidate),
            30 => Ok(ReleaseType::Development),
            other => Err(ValidationError::InvalidValue {
                field: "releaseType".to_string(),
                reason: format!("unknown release type {other}, expected 10, 20 or 30"),
            }),
        }
    }
}

impl From<ReleaseType> for i64 {
    fn from(release: ReleaseType) -> Self {
        release.code()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Monotonic by convention only.
    pub version: i64,
    pub change_date: Timestamp,
    pub release_type: ReleaseType,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub version_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct NewVersion {
    pub version: i64,
    pub change_date: Option<String>,
    /// 10 = RELEASE, 20 = RELEASE_CANDIDATE, 30 = DEVELOPMENT
    pub release_type: i64,
    #[serde(rename = "downloadURL")]
    pub download_url: String,
    pub version_text: String,
    pub text: String,
}

impl NewVersion {
    pub fn into_record(self, now: Timestamp) -> Result<(VersionRecord, Option<String>), ValidationError> {
        let release_type = ReleaseType::try_from(self.release_type)?;
        let change_date = wire::parse_optional_timestamp(CHANGE_DATE_FIELD, self.change_date.as_deref())?;
        let record = VersionRecord {
            version: self.version,
            change_date: change_date.unwrap_or(now),
            release_type,
            download_url: self.download_url,
            version_text: self.version_text,
        };
        Ok((record, Some(self.text).filter(|t| !t.is_empty())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct VersionView {
    pub id: i64,
    pub version: i64,
    #[serde(with = "wire::timestamp")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub change_date: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = i64))]
    pub release_type: ReleaseType,
    #[serde(rename = "downloadURL")]
    pub download_url: String,
    pub version_text: String,
}

impl AppendOnlyRecord for VersionRecord {
    type View = VersionView;

    const ENTITY_KIND: &'static str = "versionentity";
    const ROOT_KEY: &'static str = "versionroot";
    const TEXT_KIND: &'static str = "versionText";
    const CACHE_KEY: &'static str = "latestversion";

    fn view(&self, id: i64) -> VersionView {
        VersionView {
            id,
            version: self.version,
            change_date: self.change_date,
            release_type: self.release_type,
            download_url: self.download_url.clone(),
            version_text: self.version_text.clone(),
        }
    }
}
