//! CloudCMS Test Utilities
//!
//! Shared test infrastructure for the CloudCMS workspace:
//! - Proptest generators for payloads, headers and records
//! - Fault-injecting store and cache doubles
//! - Fixtures for common scenarios
//! - Assertions on the error taxonomy

pub use cloudcms_core::{
    ChartPayload, CmsError, CmsResult, ContentDocument, CuratorRecord, GChartPayload, HeaderView,
    OperationalStatus, ReleaseType, StatusRecord, StorageError, TelemetryUpsert, Timestamp,
    UserMetricPayload, ValidationError, VersionRecord,
};
pub use cloudcms_storage::{DocKey, DocumentStore, InMemoryDocumentStore, LatestValueCache, Query};

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;

// ============================================================================
// FAULT-INJECTING DOUBLES
// ============================================================================

/// Document store that fails operations on selected kinds.
///
/// Operations on other kinds pass through to an in-memory store. With no
/// kinds selected every operation fails, the health check included.
pub struct FailingStore {
    inner: InMemoryDocumentStore,
    failing_kinds: HashSet<String>,
    error: StorageError,
}

impl FailingStore {
    /// Fail every operation with a backend error.
    pub fn new() -> Self {
        Self::with_error(StorageError::backend("injected failure"))
    }

    pub fn with_error(error: StorageError) -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            failing_kinds: HashSet::new(),
            error,
        }
    }

    /// Fail only operations on `kinds`.
    pub fn failing_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing_kinds: kinds.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    fn check(&self, kind: &str) -> CmsResult<()> {
        if self.failing_kinds.is_empty() || self.failing_kinds.contains(kind) {
            Err(CmsError::Storage(self.error.clone()))
        } else {
            Ok(())
        }
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert(&self, kind: &str, parent: Option<&DocKey>, doc: Value) -> CmsResult<DocKey> {
        self.check(kind)?;
        self.inner.insert(kind, parent, doc).await
    }

    async fn put(&self, key: &DocKey, doc: Value) -> CmsResult<()> {
        self.check(&key.kind)?;
        self.inner.put(key, doc).await
    }

    async fn get(&self, key: &DocKey) -> CmsResult<Option<Value>> {
        self.check(&key.kind)?;
        self.inner.get(key).await
    }

    async fn query(&self, query: &Query) -> CmsResult<Vec<(DocKey, Value)>> {
        self.check(&query.kind)?;
        self.inner.query(query).await
    }

    async fn count(&self, query: &Query) -> CmsResult<usize> {
        self.check(&query.kind)?;
        self.inner.count(query).await
    }

    async fn health_check(&self) -> CmsResult<()> {
        if self.failing_kinds.is_empty() {
            return Err(CmsError::Storage(self.error.clone()));
        }
        self.inner.health_check().await
    }
}

/// Cache whose every operation fails.
#[derive(Debug, Clone, Default)]
pub struct FailingCache;

#[async_trait]
impl LatestValueCache for FailingCache {
    async fn get(&self, _key: &str) -> CmsResult<Option<Value>> {
        Err(StorageError::backend("cache unavailable").into())
    }

    async fn set(&self, _key: &str, _value: Value) -> CmsResult<()> {
        Err(StorageError::backend("cache unavailable").into())
    }

    async fn flush(&self) -> CmsResult<()> {
        Err(StorageError::backend("cache unavailable").into())
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for CloudCMS types.

    use super::*;
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;

    /// Generate a Timestamp with whole seconds (2020-2030).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64)
            .prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
    }

    pub fn arb_operational_status() -> impl Strategy<Value = OperationalStatus> {
        prop_oneof![
            Just(OperationalStatus::Ok),
            Just(OperationalStatus::PartialFailure),
            Just(OperationalStatus::Outage),
        ]
    }

    pub fn arb_release_type() -> impl Strategy<Value = ReleaseType> {
        prop_oneof![
            Just(ReleaseType::Release),
            Just(ReleaseType::ReleaseCandidate),
            Just(ReleaseType::Development),
        ]
    }

    /// Generate a client-submitted header. The id is left at zero.
    pub fn arb_header_view() -> impl Strategy<Value = HeaderView> {
        (
            "[A-Za-z ]{1,24}",
            "[a-z ]{0,48}",
            prop_oneof![Just("en"), Just("de"), Just("fr")],
            "[0-9]\\.[0-9]{1,2}",
            "[a-z0-9-]{1,12}",
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(name, description, language, version, creator, curated, deleted)| HeaderView {
                id: 0,
                name,
                description,
                language: language.to_string(),
                producing_version: version,
                last_changed: None,
                creator_id: creator,
                curated,
                deleted,
            })
    }

    pub fn arb_chart_payload() -> impl Strategy<Value = ChartPayload> {
        (
            "<chart>[a-z]{1,32}</chart>",
            prop::collection::vec(any::<u8>(), 0..64),
            "[a-z]{1,12}",
            "[a-z]{1,8}@example\\.org",
        )
            .prop_map(|(chart_xml, image, creator_nick, creator_email)| ChartPayload {
                chart_xml,
                image,
                creator_nick,
                creator_email,
            })
    }

    pub fn arb_chart_document() -> impl Strategy<Value = ContentDocument<ChartPayload>> {
        (arb_header_view(), arb_chart_payload()).prop_map(|(header, payload)| ContentDocument { header, payload })
    }

    pub fn arb_curator_record() -> impl Strategy<Value = CuratorRecord> {
        ("[a-z0-9-]{1,12}", "[a-z]{1,12}").prop_map(|(curator_id, nickname)| CuratorRecord {
            email: format!("{nickname}@example.org"),
            curator_id,
            nickname,
        })
    }

    /// Generate a valid telemetry upsert (non-blank key, non-negative increment).
    pub fn arb_telemetry_upsert() -> impl Strategy<Value = TelemetryUpsert> {
        (
            "[a-f0-9]{8,16}",
            prop::option::of(0i64..100),
            prop_oneof![Just("Linux"), Just("Windows"), Just("macOS")],
            "[0-9]\\.[0-9]",
        )
            .prop_map(|(user_key, increment, os, version)| TelemetryUpsert {
                user_key,
                increment,
                operating_system: os.to_string(),
                client_version: version,
            })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built values for common scenarios.

    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// Fixed reference instant used across tests.
    pub fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }

    pub fn minutes_after_t0(minutes: i64) -> Timestamp {
        t0() + Duration::minutes(minutes)
    }

    pub fn chart(name: &str, creator_id: &str) -> ContentDocument<ChartPayload> {
        ContentDocument {
            header: HeaderView {
                name: name.to_string(),
                creator_id: creator_id.to_string(),
                language: "en".to_string(),
                ..HeaderView::default()
            },
            payload: ChartPayload {
                chart_xml: format!("<chart name=\"{name}\"/>"),
                image: vec![0x89, 0x50, 0x4e, 0x47],
                creator_nick: creator_id.to_string(),
                creator_email: format!("{creator_id}@example.org"),
            },
        }
    }

    pub fn curator(curator_id: &str) -> CuratorRecord {
        CuratorRecord {
            curator_id: curator_id.to_string(),
            nickname: format!("{curator_id}-nick"),
            email: format!("{curator_id}@example.org"),
        }
    }

    pub fn status(status: OperationalStatus, change_date: Timestamp) -> StatusRecord {
        StatusRecord { status, change_date }
    }

    pub fn version(version: i64, change_date: Timestamp) -> VersionRecord {
        VersionRecord {
            version,
            change_date,
            release_type: ReleaseType::Release,
            download_url: format!("https://downloads.example.org/{version}"),
            version_text: format!("v{version}"),
        }
    }

    pub fn telemetry(user_key: &str, increment: Option<i64>) -> TelemetryUpsert {
        TelemetryUpsert {
            user_key: user_key.to_string(),
            increment,
            operating_system: "Linux".to_string(),
            client_version: "3.6".to_string(),
        }
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on the CloudCMS error taxonomy.

    use super::*;

    /// Assert that a CmsResult is a NotFound storage error.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &CmsResult<T>) {
        match result {
            Err(CmsError::Storage(StorageError::NotFound { .. })) => {}
            other => panic!("Expected NotFound, got: {:?}", other),
        }
    }

    /// Assert that a CmsResult is an over-quota storage error.
    #[track_caller]
    pub fn assert_over_quota<T: std::fmt::Debug>(result: &CmsResult<T>) {
        match result {
            Err(CmsError::Storage(e)) if e.is_over_quota() => {}
            other => panic!("Expected OverQuota, got: {:?}", other),
        }
    }

    /// Assert that a CmsResult is a validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &CmsResult<T>) {
        match result {
            Err(CmsError::Validation(_)) => {}
            other => panic!("Expected validation error, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_store_scopes_failures_by_kind() {
        let store = FailingStore::failing_kinds(["statusentity"]);
        let key = store.insert("chartentity", None, serde_json::json!({})).await.unwrap();
        assert!(store.get(&key).await.unwrap().is_some());
        assert!(store.query(&Query::kind("statusentity")).await.is_err());
        assert!(store.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_store_default_fails_everything() {
        let store = FailingStore::new();
        assert!(store.insert("chartentity", None, serde_json::json!({})).await.is_err());
        assert!(store.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_failing_cache() {
        let cache = FailingCache;
        assert!(cache.get("currentstatus").await.is_err());
        assert!(cache.flush().await.is_err());
    }
}
