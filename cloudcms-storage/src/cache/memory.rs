//! In-process latest-value cache backed by `DashMap`.

use async_trait::async_trait;
use cloudcms_core::CmsResult;
use dashmap::DashMap;
use serde_json::Value;

use super::traits::LatestValueCache;

/// Lossy in-process cache.
///
/// With a non-zero capacity, inserting a new key into a full cache evicts an
/// arbitrary existing entry. A capacity of 0 means unbounded.
#[derive(Debug, Default)]
pub struct InMemoryLatestCache {
    entries: DashMap<String, Value>,
    capacity: usize,
}

impl InMemoryLatestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl LatestValueCache for InMemoryLatestCache {
    async fn get(&self, key: &str) -> CmsResult<Option<Value>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> CmsResult<()> {
        if self.capacity > 0 && self.entries.len() >= self.capacity && !self.entries.contains_key(key) {
            // The iterator guard must be released before removing.
            let victim = self.entries.iter().next().map(|entry| entry.key().clone());
            if let Some(victim) = victim {
                self.entries.remove(&victim);
            }
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn flush(&self) -> CmsResult<()> {
        self.entries.clear();
        Ok(())
    }
}
