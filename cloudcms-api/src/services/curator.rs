//! Curator registry service.

use cloudcms_core::{
    CmsResult, Curator, CuratorRecord, StorageError, CURATOR_ENTITY_KIND, CURATOR_ID_FIELD, CURATOR_ROOT_KEY,
};
use cloudcms_storage::{decode_doc, encode_doc, DocKey, Query};

use crate::state::AppState;
use crate::telemetry::metrics::timed_store_op;

fn root() -> DocKey {
    DocKey::root(CURATOR_ENTITY_KIND, CURATOR_ROOT_KEY)
}

pub async fn create(state: &AppState, record: &CuratorRecord) -> CmsResult<i64> {
    let doc = encode_doc(CURATOR_ENTITY_KIND, record)?;
    let key = timed_store_op(
        "insert",
        CURATOR_ENTITY_KIND,
        state.store.insert(CURATOR_ENTITY_KIND, Some(&root()), doc),
    )
    .await?;
    let id = key
        .numeric_id()
        .ok_or_else(|| StorageError::backend(format!("store returned non-numeric key {key}")))?;
    tracing::info!(id, curator_id = %record.curator_id, "Registered curator");
    Ok(id)
}

/// All curators, or those registered under `curator_id`.
pub async fn list(state: &AppState, curator_id: Option<&str>) -> CmsResult<Vec<Curator>> {
    let mut query = Query::kind(CURATOR_ENTITY_KIND).ancestor(root());
    if let Some(curator_id) = curator_id.filter(|c| !c.is_empty()) {
        query = query.eq(CURATOR_ID_FIELD, curator_id);
    }
    let rows = timed_store_op("query", CURATOR_ENTITY_KIND, state.store.query(&query)).await?;
    rows.into_iter()
        .map(|(key, doc)| {
            let id = key.numeric_id().unwrap_or_default();
            decode_doc::<CuratorRecord>(&key, doc).map(|record| Curator::from_record(id, record))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    fn record(curator_id: &str) -> CuratorRecord {
        CuratorRecord {
            curator_id: curator_id.to_string(),
            nickname: format!("{curator_id}-nick"),
            email: format!("{curator_id}@example.org"),
        }
    }

    #[tokio::test]
    async fn test_create_and_filter() {
        let state = AppState::in_memory(ApiConfig::default());
        let a = create(&state, &record("a")).await.unwrap();
        create(&state, &record("b")).await.unwrap();

        assert_eq!(list(&state, None).await.unwrap().len(), 2);
        assert_eq!(list(&state, Some("")).await.unwrap().len(), 2);

        let only_a = list(&state, Some("a")).await.unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].id, a);
        assert_eq!(only_a[0].email, "a@example.org");
    }
}
