//! In-process document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use cloudcms_core::{CmsResult, StorageError};
use serde_json::Value;
use tokio::sync::RwLock;

use super::traits::DocumentStore;
use crate::key::DocKey;
use crate::query::Query;

#[derive(Debug, Default)]
struct MemoryState {
    docs: BTreeMap<DocKey, Value>,
    last_id: i64,
}

/// Document store held in memory.
///
/// An optional document quota makes capacity exhaustion testable: writes
/// that would add a document beyond the quota fail with `OverQuota`.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    state: RwLock<MemoryState>,
    max_documents: Option<usize>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(max_documents: usize) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            max_documents: Some(max_documents),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.docs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_quota(&self, state: &MemoryState) -> CmsResult<()> {
        match self.max_documents {
            Some(max) if state.docs.len() >= max => Err(StorageError::OverQuota {
                reason: format!("document quota of {max} reached"),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, kind: &str, parent: Option<&DocKey>, doc: Value) -> CmsResult<DocKey> {
        let mut state = self.state.write().await;
        self.check_quota(&state)?;
        state.last_id += 1;
        let key = DocKey::numeric(kind, state.last_id, parent);
        state.docs.insert(key.clone(), doc);
        Ok(key)
    }

    async fn put(&self, key: &DocKey, doc: Value) -> CmsResult<()> {
        let mut state = self.state.write().await;
        if !state.docs.contains_key(key) {
            self.check_quota(&state)?;
        }
        state.docs.insert(key.clone(), doc);
        Ok(())
    }

    async fn get(&self, key: &DocKey) -> CmsResult<Option<Value>> {
        Ok(self.state.read().await.docs.get(key).cloned())
    }

    async fn query(&self, query: &Query) -> CmsResult<Vec<(DocKey, Value)>> {
        let state = self.state.read().await;
        let candidates = state
            .docs
            .iter()
            .filter(|(key, _)| key.kind == query.kind)
            .map(|(key, doc)| (key.clone(), doc.clone()))
            .collect();
        Ok(query.execute(candidates))
    }

    async fn count(&self, query: &Query) -> CmsResult<usize> {
        let state = self.state.read().await;
        Ok(query.count(state.docs.iter()))
    }

    async fn health_check(&self) -> CmsResult<()> {
        let _ = self.state.read().await;
        Ok(())
    }
}
