//! Latest-pointer service for append-only records (status, version).
//!
//! Reads are cache-aside under one well-known key per record kind: a hit
//! is returned verbatim, a miss falls back to "newest by changeDate" in
//! the store and repopulates the cache. Every insert flushes the whole
//! cache afterwards. Cache failures are never errors.

use cloudcms_core::{
    AppendOnlyRecord, CmsResult, OperationalStatus, RecordText, RecordTextView, StatusRecord,
    StorageError, Timestamp, CHANGE_DATE_FIELD,
};
use cloudcms_storage::{decode_doc, encode_doc, Direction, DocKey, DocumentStore, LatestValueCache, Query};

use crate::state::AppState;
use crate::telemetry::metrics::{record_cache_lookup, timed_store_op};

fn root<R: AppendOnlyRecord>() -> DocKey {
    DocKey::root(R::ENTITY_KIND, R::ROOT_KEY)
}

/// The single text child of record `id`. Fixed key, so at most one exists.
fn text_key<R: AppendOnlyRecord>(id: i64) -> DocKey {
    let parent = DocKey::numeric(R::ENTITY_KIND, id, Some(&root::<R>()));
    DocKey::numeric(R::TEXT_KIND, 1, Some(&parent))
}

fn base_query<R: AppendOnlyRecord>() -> Query {
    Query::kind(R::ENTITY_KIND).ancestor(root::<R>())
}

/// Append a record, flush the cache, then store the optional text.
pub async fn create<R: AppendOnlyRecord>(
    state: &AppState,
    record: &R,
    text: Option<String>,
) -> CmsResult<i64> {
    let doc = encode_doc(R::ENTITY_KIND, record)?;
    let key = timed_store_op(
        "insert",
        R::ENTITY_KIND,
        state.store.insert(R::ENTITY_KIND, Some(&root::<R>()), doc),
    )
    .await?;
    let id = key
        .numeric_id()
        .ok_or_else(|| StorageError::backend(format!("store returned non-numeric key {key}")))?;

    // The record is stored; flush before anything else can fail. Flush
    // rather than set: the next read recomputes from the store.
    if let Err(e) = state.cache.flush().await {
        tracing::warn!(error = %e, kind = R::ENTITY_KIND, "Cache flush after insert failed");
    }

    if let Some(text) = text {
        let doc = encode_doc(R::TEXT_KIND, &RecordText { text })?;
        timed_store_op("put", R::TEXT_KIND, state.store.put(&text_key::<R>(id), doc)).await?;
    }

    tracing::info!(kind = R::ENTITY_KIND, id, "Appended record");
    Ok(id)
}

/// Resolve the newest record, cache first.
///
/// `Ok(None)` means no record exists yet.
pub async fn latest<R: AppendOnlyRecord>(
    store: &dyn DocumentStore,
    cache: &dyn LatestValueCache,
) -> CmsResult<Option<R::View>> {
    match cache.get(R::CACHE_KEY).await {
        Ok(Some(value)) => match serde_json::from_value::<R::View>(value) {
            Ok(view) => {
                record_cache_lookup(R::CACHE_KEY, "hit");
                return Ok(Some(view));
            }
            Err(e) => {
                tracing::warn!(error = %e, key = R::CACHE_KEY, "Ignoring undecodable cache entry");
                record_cache_lookup(R::CACHE_KEY, "error");
            }
        },
        Ok(None) => record_cache_lookup(R::CACHE_KEY, "miss"),
        Err(e) => {
            tracing::warn!(error = %e, key = R::CACHE_KEY, "Cache lookup failed, reading store");
            record_cache_lookup(R::CACHE_KEY, "error");
        }
    }

    let query = base_query::<R>()
        .order_by(CHANGE_DATE_FIELD, Direction::Desc)
        .limit(1);
    let newest = timed_store_op("query", R::ENTITY_KIND, store.query(&query)).await?;
    let Some((key, doc)) = newest.into_iter().next() else {
        return Ok(None);
    };

    let record: R = decode_doc(&key, doc)?;
    let view = record.view(key.numeric_id().unwrap_or_default());

    match serde_json::to_value(&view) {
        Ok(value) => {
            if let Err(e) = cache.set(R::CACHE_KEY, value).await {
                tracing::warn!(error = %e, key = R::CACHE_KEY, "Cache populate failed");
            }
        }
        Err(e) => tracing::warn!(error = %e, key = R::CACHE_KEY, "Cannot encode cache entry"),
    }
    Ok(Some(view))
}

/// Records changed at or after `date_from`, newest first.
pub async fn list_since<R: AppendOnlyRecord>(
    store: &dyn DocumentStore,
    date_from: Option<Timestamp>,
) -> CmsResult<Vec<R::View>> {
    let mut query = base_query::<R>().order_by(CHANGE_DATE_FIELD, Direction::Desc);
    if let Some(from) = date_from {
        query = query.ge(CHANGE_DATE_FIELD, from);
    }
    run_list::<R>(store, &query).await
}

/// Records whose `field` is strictly greater than `value`, by `field` descending.
pub async fn list_above<R: AppendOnlyRecord>(
    store: &dyn DocumentStore,
    field: &str,
    value: i64,
) -> CmsResult<Vec<R::View>> {
    let query = base_query::<R>()
        .gt(field, value)
        .order_by(field, Direction::Desc);
    run_list::<R>(store, &query).await
}

async fn run_list<R: AppendOnlyRecord>(store: &dyn DocumentStore, query: &Query) -> CmsResult<Vec<R::View>> {
    let rows = timed_store_op("query", R::ENTITY_KIND, store.query(query)).await?;
    rows.into_iter()
        .map(|(key, doc)| {
            let id = key.numeric_id().unwrap_or_default();
            decode_doc::<R>(&key, doc).map(|record| record.view(id))
        })
        .collect()
}

/// Free text attached to record `id`.
pub async fn text<R: AppendOnlyRecord>(store: &dyn DocumentStore, id: i64) -> CmsResult<RecordTextView> {
    let key = text_key::<R>(id);
    let doc = timed_store_op("get", R::TEXT_KIND, store.get(&key))
        .await?
        .ok_or_else(|| StorageError::not_found(R::TEXT_KIND, id))?;
    let record: RecordText = decode_doc(&key, doc)?;
    Ok(RecordTextView { id, text: record.text })
}

/// Fail-open status resolution used by the admission gate.
///
/// Any failure, and the absence of any status record, yields `None`.
pub async fn current_status(store: &dyn DocumentStore, cache: &dyn LatestValueCache) -> Option<OperationalStatus> {
    match latest::<StatusRecord>(store, cache).await {
        Ok(view) => view.map(|v| v.status),
        Err(e) => {
            tracing::warn!(error = %e, "Status resolution failed, admitting request");
            None
        }
    }
}
