//! CloudCMS Core - data model and lifecycle rules
//!
//! Storage-agnostic types and pure decision functions shared by the store,
//! the services and the HTTP façade. Nothing in this crate performs I/O.

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

pub mod clock;
pub mod content;
pub mod curator;
pub mod error;
pub mod header;
pub mod health;
pub mod lifecycle;
pub mod record;
pub mod status;
pub mod telemetry;
pub mod version;
pub mod wire;

pub use clock::{Clock, FixedClock, SteppingClock, SystemClock};
pub use content::{
    ChartPayload, ContentDocument, ContentKind, GChartPayload, Payload, StoredContent, UserMetricPayload,
};
pub use curator::{Curator, CuratorRecord, CURATOR_ENTITY_KIND, CURATOR_ID_FIELD, CURATOR_ROOT_KEY};
pub use error::{CmsError, CmsResult, ConfigError, StorageError, ValidationError};
pub use header::{ContentHeader, HeaderOnly, HeaderView, StoredHeaderOnly, LAST_CHANGED_PATH, MAX_HEADERS_PER_CALL};
pub use health::{ComponentHealth, HealthReport, HealthStatus};
pub use lifecycle::Transition;
pub use record::{AppendOnlyRecord, RecordText, RecordTextView, CHANGE_DATE_FIELD};
pub use status::{admit, Admission, NewStatus, OperationalStatus, StatusRecord, StatusView, GATE_CLOSED_REASON};
pub use telemetry::{
    GeoOrigin, TelemetryFilter, TelemetryListParams, TelemetryRecord, TelemetryUpsert, TelemetryView,
};
pub use version::{NewVersion, ReleaseType, VersionRecord, VersionView};
