//! Document store abstraction.

use async_trait::async_trait;
use cloudcms_core::{CmsResult, StorageError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::key::DocKey;
use crate::query::Query;

/// Keyed, ancestor-scoped document store.
///
/// Implementations must be safe for concurrent use from many request
/// handlers. Concurrent writes to one key are last-writer-wins; no
/// operation is retried internally.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document under a freshly allocated positive numeric id.
    async fn insert(&self, kind: &str, parent: Option<&DocKey>, doc: Value) -> CmsResult<DocKey>;

    /// Create or replace the document at `key`.
    async fn put(&self, key: &DocKey, doc: Value) -> CmsResult<()>;

    async fn get(&self, key: &DocKey) -> CmsResult<Option<Value>>;

    async fn query(&self, query: &Query) -> CmsResult<Vec<(DocKey, Value)>>;

    /// Count matches of `query`, ignoring its limit.
    async fn count(&self, query: &Query) -> CmsResult<usize>;

    /// Cheap liveness probe used by the readiness endpoint.
    async fn health_check(&self) -> CmsResult<()>;
}

/// Serialize a typed document for storage.
pub fn encode_doc<T: Serialize>(kind: &str, value: &T) -> CmsResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        StorageError::backend(format!("cannot serialize {kind} document: {e}")).into()
    })
}

/// Decode a stored document. Unknown fields are ignored; a document whose
/// known fields have the wrong type is reported as corrupt.
pub fn decode_doc<T: DeserializeOwned>(key: &DocKey, doc: Value) -> CmsResult<T> {
    serde_json::from_value(doc).map_err(|e| {
        StorageError::Corrupt {
            kind: key.kind.clone(),
            key: key.id.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcms_core::{CmsError, CuratorRecord};
    use serde_json::json;

    #[test]
    fn test_decode_tolerates_extra_and_missing_fields() {
        let key = DocKey::numeric("curatorentity", 1, None);
        let record: CuratorRecord =
            decode_doc(&key, json!({ "curatorId": "c", "legacyField": 3 })).unwrap();
        assert_eq!(record.curator_id, "c");
        assert_eq!(record.email, "");
    }

    #[test]
    fn test_decode_reports_corrupt() {
        let key = DocKey::numeric("curatorentity", 1, None);
        let result: CmsResult<CuratorRecord> = decode_doc(&key, json!({ "curatorId": 5 }));
        assert!(matches!(
            result,
            Err(CmsError::Storage(StorageError::Corrupt { .. }))
        ));
    }
}
