//! Append-only record kinds with a "latest" pointer.
//!
//! Status and version announcements share the same storage pattern: records
//! are only ever appended under a fixed root, each may carry at most one
//! free-text child, and "current" means most recent by `changeDate`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Stored field holding the change timestamp of an append-only record.
pub const CHANGE_DATE_FIELD: &str = "changeDate";

pub trait AppendOnlyRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Client-facing shape, also the value kept in the latest-value cache.
    type View: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    const ENTITY_KIND: &'static str;
    const ROOT_KEY: &'static str;
    const TEXT_KIND: &'static str;
    /// Well-known cache key of the latest record, one per kind.
    const CACHE_KEY: &'static str;

    fn view(&self, id: i64) -> Self::View;
}

/// Optional free-text child of an append-only record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordText {
    pub text: String,
}

/// Text lookup response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordTextView {
    /// Id of the parent record.
    pub id: i64,
    pub text: String,
}
