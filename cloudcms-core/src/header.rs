//! Content header and its header-only projection.
//!
//! Every content entity embeds a [`ContentHeader`]. Bulk listing never ships
//! payload; it ships [`HeaderOnly`] records built from the stored header.
//! Mapping stored header ⇄ wire header is field-complete in both directions.

use serde::{Deserialize, Serialize};

use crate::wire;
use crate::Timestamp;

/// Hard cap on records returned by one header listing call.
///
/// Callers page by passing the last seen `lastChanged` as the next `dateFrom`.
pub const MAX_HEADERS_PER_CALL: usize = 200;

/// Stored path of the change timestamp every listing filters and orders on.
pub const LAST_CHANGED_PATH: &str = "header.lastChanged";

/// Stored header embedded in every content entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentHeader {
    pub name: String,
    pub description: String,
    pub language: String,
    pub producing_version: String,
    pub last_changed: Timestamp,
    pub creator_id: String,
    pub curated: bool,
    pub deleted: bool,
}

/// Header as it appears on the wire, carrying the generated id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderView {
    /// Generated id. Zero or absent on create.
    pub id: i64,
    pub name: String,
    pub description: String,
    pub language: String,
    #[serde(alias = "gcversion")]
    pub producing_version: String,
    /// `%Y-%m-%dT%H:%M:%SZ`. Ignored on input; the server stamps it.
    #[serde(with = "wire::lenient_timestamp", alias = "lastChange")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub last_changed: Option<Timestamp>,
    pub creator_id: String,
    pub curated: bool,
    pub deleted: bool,
}

impl HeaderView {
    /// Project a stored header for output.
    pub fn from_stored(id: i64, header: &ContentHeader) -> Self {
        Self {
            id,
            name: header.name.clone(),
            description: header.description.clone(),
            language: header.language.clone(),
            producing_version: header.producing_version.clone(),
            last_changed: Some(header.last_changed),
            creator_id: header.creator_id.clone(),
            curated: header.curated,
            deleted: header.deleted,
        }
    }

    /// Convert back to the stored shape. The lifecycle core overwrites
    /// `lastChanged`, `curated` and `deleted` before anything is persisted.
    pub fn to_stored(&self) -> ContentHeader {
        ContentHeader {
            name: self.name.clone(),
            description: self.description.clone(),
            language: self.language.clone(),
            producing_version: self.producing_version.clone(),
            last_changed: self.last_changed.unwrap_or_default(),
            creator_id: self.creator_id.clone(),
            curated: self.curated,
            deleted: self.deleted,
        }
    }
}

/// Stored view that decodes only the header of a content document.
///
/// Extra payload fields in the document are ignored, so listing tolerates
/// documents written by older or newer schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoredHeaderOnly {
    pub header: ContentHeader,
}

/// Element of a header listing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HeaderOnly {
    pub header: HeaderView,
}

impl HeaderOnly {
    pub fn new(id: i64, header: &ContentHeader) -> Self {
        Self {
            header: HeaderView::from_stored(id, header),
        }
    }
}
