//! Single-value cache used for "latest" lookups.

use async_trait::async_trait;
use cloudcms_core::CmsResult;
use serde_json::Value;

/// Best-effort key/value cache.
///
/// The cache may drop entries at any time. Callers treat every error as a
/// miss and never depend on a value being present.
#[async_trait]
pub trait LatestValueCache: Send + Sync {
    async fn get(&self, key: &str) -> CmsResult<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> CmsResult<()>;

    /// Drop every entry, whatever its key.
    async fn flush(&self) -> CmsResult<()>;
}
