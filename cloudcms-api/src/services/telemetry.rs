//! Telemetry upsert and listing.

use cloudcms_core::telemetry::{
    merge, CLIENT_VERSION_FIELD, CREATE_DATE_FIELD, LAST_CHANGE_FIELD, OPERATING_SYSTEM_FIELD,
    TELEMETRY_ENTITY_KIND, TELEMETRY_ROOT_KEY,
};
use cloudcms_core::{
    lifecycle, CmsResult, GeoOrigin, TelemetryFilter, TelemetryRecord, TelemetryUpsert, TelemetryView,
};
use cloudcms_storage::{decode_doc, encode_doc, Direction, DocKey, Query};

use crate::state::AppState;
use crate::telemetry::metrics::timed_store_op;

fn root() -> DocKey {
    DocKey::root(TELEMETRY_ENTITY_KIND, TELEMETRY_ROOT_KEY)
}

/// Merge one usage report into the client's record.
///
/// Get then put, no transaction: concurrent upserts for one key may lose
/// an increment.
pub async fn upsert(state: &AppState, request: &TelemetryUpsert, origin: &GeoOrigin) -> CmsResult<()> {
    let (user_key, increment) = request.validate()?;
    let key = DocKey::named(TELEMETRY_ENTITY_KIND, user_key, Some(&root()));

    let existing = match timed_store_op("get", TELEMETRY_ENTITY_KIND, state.store.get(&key)).await? {
        Some(doc) => Some(decode_doc::<TelemetryRecord>(&key, doc)?),
        None => None,
    };
    let created = existing.is_none();

    let record = merge(existing, request, origin, lifecycle::stamp(state.clock.as_ref()))?;
    let doc = encode_doc(TELEMETRY_ENTITY_KIND, &record)?;
    timed_store_op("put", TELEMETRY_ENTITY_KIND, state.store.put(&key, doc)).await?;

    tracing::info!(created, increment, use_count = record.use_count, "Merged telemetry");
    Ok(())
}

fn filter_query(filter: &TelemetryFilter) -> Query {
    let query = Query::kind(TELEMETRY_ENTITY_KIND).ancestor(root());
    match filter {
        TelemetryFilter::CreatedAfter(from) => query
            .ge(CREATE_DATE_FIELD, *from)
            .order_by(CREATE_DATE_FIELD, Direction::Desc),
        TelemetryFilter::UpdatedAfter(from) => query
            .ge(LAST_CHANGE_FIELD, *from)
            .order_by(LAST_CHANGE_FIELD, Direction::Desc),
        TelemetryFilter::OperatingSystem(os) => query.eq(OPERATING_SYSTEM_FIELD, os.as_str()),
        TelemetryFilter::ClientVersion(version) => query.eq(CLIENT_VERSION_FIELD, version.as_str()),
        TelemetryFilter::All => query,
    }
}

pub async fn list(state: &AppState, filter: &TelemetryFilter) -> CmsResult<Vec<TelemetryView>> {
    let rows = timed_store_op(
        "query",
        TELEMETRY_ENTITY_KIND,
        state.store.query(&filter_query(filter)),
    )
    .await?;
    rows.into_iter()
        .map(|(key, doc)| decode_doc::<TelemetryRecord>(&key, doc).map(TelemetryView::from))
        .collect()
}
