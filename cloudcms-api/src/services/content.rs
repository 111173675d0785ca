//! Content lifecycle service.
//!
//! One implementation for every content kind, parameterised by its
//! [`Payload`]. The lifecycle decisions come from `cloudcms_core::lifecycle`;
//! this module only sequences store calls around them.

use cloudcms_core::{
    lifecycle::{self, Transition},
    CmsResult, ContentDocument, HeaderOnly, Payload, StorageError, StoredContent, StoredHeaderOnly,
    Timestamp, CURATOR_ENTITY_KIND, CURATOR_ID_FIELD, CURATOR_ROOT_KEY, LAST_CHANGED_PATH,
    MAX_HEADERS_PER_CALL,
};
use cloudcms_storage::{decode_doc, encode_doc, Direction, DocKey, DocumentStore, Query};

use crate::state::AppState;
use crate::telemetry::metrics::timed_store_op;

fn root<P: Payload>() -> DocKey {
    DocKey::root(P::KIND.entity_kind(), P::KIND.root_key())
}

fn entity_key<P: Payload>(id: i64) -> DocKey {
    DocKey::numeric(P::KIND.entity_kind(), id, Some(&root::<P>()))
}

fn header_query<P: Payload>(date_from: Option<Timestamp>) -> Query {
    let query = Query::kind(P::KIND.entity_kind()).ancestor(root::<P>());
    match date_from {
        Some(from) => query.ge(LAST_CHANGED_PATH, from),
        None => query,
    }
}

/// Number of curators registered under `creator_id`.
///
/// `None` when the lookup fails; auto-curation then simply does not apply.
async fn curator_matches(store: &dyn DocumentStore, creator_id: &str) -> Option<usize> {
    let query = Query::kind(CURATOR_ENTITY_KIND)
        .ancestor(DocKey::root(CURATOR_ENTITY_KIND, CURATOR_ROOT_KEY))
        .eq(CURATOR_ID_FIELD, creator_id);
    match timed_store_op("count", CURATOR_ENTITY_KIND, store.count(&query)).await {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(error = %e, creator_id, "Curator lookup failed, leaving entity uncurated");
            None
        }
    }
}

async fn load<P: Payload>(store: &dyn DocumentStore, id: i64) -> CmsResult<StoredContent<P>> {
    let key = entity_key::<P>(id);
    let doc = timed_store_op("get", P::KIND.entity_kind(), store.get(&key))
        .await?
        .ok_or_else(|| StorageError::not_found(P::KIND.to_string(), id))?;
    decode_doc(&key, doc)
}

async fn save<P: Payload>(store: &dyn DocumentStore, id: i64, entity: &StoredContent<P>) -> CmsResult<()> {
    let doc = encode_doc(P::KIND.entity_kind(), entity)?;
    timed_store_op("put", P::KIND.entity_kind(), store.put(&entity_key::<P>(id), doc)).await
}

/// Store a new entity and return its generated id.
pub async fn create<P: Payload>(state: &AppState, document: ContentDocument<P>) -> CmsResult<i64> {
    let (_, submitted) = document.into_stored();
    let matches = curator_matches(state.store.as_ref(), &submitted.header.creator_id).await;
    let entity = lifecycle::prepare_create(submitted, matches, lifecycle::stamp(state.clock.as_ref()));

    let doc = encode_doc(P::KIND.entity_kind(), &entity)?;
    let key = timed_store_op(
        "insert",
        P::KIND.entity_kind(),
        state.store.insert(P::KIND.entity_kind(), Some(&root::<P>()), doc),
    )
    .await?;
    let id = key
        .numeric_id()
        .ok_or_else(|| StorageError::backend(format!("store returned non-numeric key {key}")))?;

    tracing::info!(kind = %P::KIND, id, curated = entity.header.curated, "Created content entity");
    Ok(id)
}

/// Replace an existing entity. The id travels in the document header.
pub async fn update<P: Payload>(state: &AppState, document: ContentDocument<P>) -> CmsResult<()> {
    let (id, incoming) = document.into_stored();
    let id = lifecycle::require_update_id(id)?;

    let existing = load::<P>(state.store.as_ref(), id).await?;
    let entity = lifecycle::prepare_update(incoming, &existing, lifecycle::stamp(state.clock.as_ref()));
    save(state.store.as_ref(), id, &entity).await?;

    tracing::info!(kind = %P::KIND, id, "Updated content entity");
    Ok(())
}

/// Apply a deletion or curation transition.
pub async fn transition<P: Payload>(state: &AppState, id: i64, transition: Transition) -> CmsResult<()> {
    let mut entity = load::<P>(state.store.as_ref(), id).await?;
    lifecycle::apply_transition(&mut entity, transition, lifecycle::stamp(state.clock.as_ref()));
    save(state.store.as_ref(), id, &entity).await?;

    tracing::info!(
        kind = %P::KIND,
        id,
        operation = transition.operation(),
        transition = ?transition,
        "Applied lifecycle transition"
    );
    Ok(())
}

pub async fn get<P: Payload>(state: &AppState, id: i64) -> CmsResult<ContentDocument<P>> {
    let entity = load::<P>(state.store.as_ref(), id).await?;
    Ok(ContentDocument::from_stored(id, entity))
}

/// One page of headers changed at or after `date_from`, oldest first.
///
/// Documents whose header cannot be decoded are skipped.
pub async fn headers<P: Payload>(state: &AppState, date_from: Option<Timestamp>) -> CmsResult<Vec<HeaderOnly>> {
    let query = header_query::<P>(date_from)
        .order_by(LAST_CHANGED_PATH, Direction::Asc)
        .limit(MAX_HEADERS_PER_CALL);
    let rows = timed_store_op("query", P::KIND.entity_kind(), state.store.query(&query)).await?;

    let headers = rows
        .into_iter()
        .filter_map(|(key, doc)| {
            let id = key.numeric_id()?;
            match decode_doc::<StoredHeaderOnly>(&key, doc) {
                Ok(projected) => Some(HeaderOnly::new(id, &projected.header)),
                Err(e) => {
                    tracing::warn!(error = %e, kind = %P::KIND, id, "Skipping undecodable header");
                    None
                }
            }
        })
        .collect();
    Ok(headers)
}

/// Number of headers matching the same filter as [`headers`], uncapped.
pub async fn count<P: Payload>(state: &AppState, date_from: Option<Timestamp>) -> CmsResult<usize> {
    let query = header_query::<P>(date_from);
    timed_store_op("count", P::KIND.entity_kind(), state.store.count(&query)).await
}
