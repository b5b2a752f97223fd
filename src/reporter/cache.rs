//! Series resolution cache.

use crate::core::{LabelMap, Result, SeriesId};
use crate::storage::MetricStore;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    metric: String,
    labels: LabelMap,
}

/// Concurrent `(metric_name, labels) -> series_id` cache fronting the
/// backend's resolve call.
///
/// Hits never touch a shared exclusive lock. On a miss the backend call
/// suspends only the producer that triggered it; concurrent misses on the
/// same key may each call the backend and each insert, which requires the
/// backend's resolution to be idempotent. Entries are never evicted while
/// the reporter lives.
pub struct SeriesCache {
    store: Arc<dyn MetricStore>,
    entries: DashMap<CacheKey, SeriesId>,
}

impl SeriesCache {
    /// Create an empty cache over the given backend.
    pub fn new(store: Arc<dyn MetricStore>) -> Self {
        Self {
            store,
            entries: DashMap::new(),
        }
    }

    /// Resolve a series id, consulting the backend on first sight of the
    /// key.
    pub async fn resolve(&self, metric_name: &str, labels: &LabelMap) -> Result<SeriesId> {
        let key = CacheKey {
            metric: metric_name.to_string(),
            labels: labels.clone(),
        };

        if let Some(id) = self.entries.get(&key) {
            return Ok(*id);
        }

        let id = self.store.resolve_series(metric_name, labels).await?;
        self.entries.insert(key, id);
        Ok(id)
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
