//! Curator registry records.

use serde::{Deserialize, Serialize};

/// Stored curator identity. Also the create request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct CuratorRecord {
    pub curator_id: String,
    pub nickname: String,
    pub email: String,
}

/// Curator as listed to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Curator {
    pub id: i64,
    pub curator_id: String,
    pub nickname: String,
    pub email: String,
}

impl Curator {
    pub fn from_record(id: i64, record: CuratorRecord) -> Self {
        Self {
            id,
            curator_id: record.curator_id,
            nickname: record.nickname,
            email: record.email,
        }
    }
}

pub const CURATOR_ENTITY_KIND: &str = "curatorentity";
pub const CURATOR_ROOT_KEY: &str = "curatorroot";

/// Field the registry is filtered on, both for listing and auto-curation.
pub const CURATOR_ID_FIELD: &str = "curatorId";
