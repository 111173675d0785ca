//! Content entity kinds and their payloads.
//!
//! Chart, GChart and UserMetric share one lifecycle and differ only in the
//! payload they carry. The lifecycle is written once against [`Payload`].

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::header::{ContentHeader, HeaderView};
use crate::wire;

// ============================================================================
// KINDS
// ============================================================================

/// Discriminator for the content entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Chart,
    GChart,
    UserMetric,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Chart, ContentKind::GChart, ContentKind::UserMetric];

    /// Document kind used in store keys and queries.
    pub fn entity_kind(&self) -> &'static str {
        match self {
            ContentKind::Chart => "chartentity",
            ContentKind::GChart => "gchartentity",
            ContentKind::UserMetric => "usermetricentity",
        }
    }

    /// Named root every entity of this kind is stored under.
    pub fn root_key(&self) -> &'static str {
        match self {
            ContentKind::Chart => "chartsroot",
            ContentKind::GChart => "gchartsroot",
            ContentKind::UserMetric => "usermetricroot",
        }
    }

    /// Path segment under `/v1`.
    pub fn route_name(&self) -> &'static str {
        match self {
            ContentKind::Chart => "chart",
            ContentKind::GChart => "gchart",
            ContentKind::UserMetric => "usermetric",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentKind::Chart => "Chart",
            ContentKind::GChart => "GChart",
            ContentKind::UserMetric => "UserMetric",
        };
        f.write_str(label)
    }
}

// ============================================================================
// PAYLOAD CAPABILITY
// ============================================================================

/// Kind-specific body of a content entity.
///
/// `clear` erases every content-bearing field. Creator display fields are
/// metadata and survive a soft delete.
pub trait Payload:
    Clone + Default + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ContentKind;

    fn clear(&mut self);

    fn is_cleared(&self) -> bool;
}

/// Chart definition markup plus a preview image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ChartPayload {
    #[serde(rename = "chartXML", alias = "chartxml")]
    pub chart_xml: String,
    #[serde(with = "wire::image")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub image: Vec<u8>,
    pub creator_nick: String,
    pub creator_email: String,
}

impl Payload for ChartPayload {
    const KIND: ContentKind = ContentKind::Chart;

    fn clear(&mut self) {
        self.chart_xml.clear();
        self.image.clear();
    }

    fn is_cleared(&self) -> bool {
        self.chart_xml.is_empty() && self.image.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct GChartPayload {
    pub chart_type: String,
    pub chart_view: String,
    pub chart_def: String,
    #[serde(with = "wire::image")]
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub image: Vec<u8>,
    pub creator_nick: String,
    pub creator_email: String,
}

impl Payload for GChartPayload {
    const KIND: ContentKind = ContentKind::GChart;

    fn clear(&mut self) {
        self.chart_type.clear();
        self.chart_view.clear();
        self.chart_def.clear();
        self.image.clear();
    }

    fn is_cleared(&self) -> bool {
        self.chart_type.is_empty()
            && self.chart_view.is_empty()
            && self.chart_def.is_empty()
            && self.image.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct UserMetricPayload {
    #[serde(rename = "metricXML", alias = "metrictxml")]
    pub metric_xml: String,
    pub creator_nick: String,
    pub creator_email: String,
}

impl Payload for UserMetricPayload {
    const KIND: ContentKind = ContentKind::UserMetric;

    fn clear(&mut self) {
        self.metric_xml.clear();
    }

    fn is_cleared(&self) -> bool {
        self.metric_xml.is_empty()
    }
}

// ============================================================================
// ENTITY SHAPES
// ============================================================================

/// Content entity as persisted in the document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "P: Payload")]
pub struct StoredContent<P> {
    #[serde(default)]
    pub header: ContentHeader,
    #[serde(flatten)]
    pub payload: P,
}

/// Content entity as exchanged with clients (full representation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "P: Payload")]
pub struct ContentDocument<P> {
    #[serde(default)]
    pub header: HeaderView,
    #[serde(flatten)]
    pub payload: P,
}

impl<P: Payload> ContentDocument<P> {
    pub fn from_stored(id: i64, stored: StoredContent<P>) -> Self {
        Self {
            header: HeaderView::from_stored(id, &stored.header),
            payload: stored.payload,
        }
    }

    /// Split into the client-supplied id and the storable entity.
    pub fn into_stored(self) -> (i64, StoredContent<P>) {
        let header = self.header.to_stored();
        (
            self.header.id,
            StoredContent {
                header,
                payload: self.payload,
            },
        )
    }
}
