//! In-memory storage backend.
//!
//! Serves two roles: the backend for in-process embedders that don't ship
//! samples anywhere, and the test double the integration suite drives. Call
//! counters and failure toggles exist for the latter.

use super::{MetricMetadata, MetricStore, RawSeries, ResolvedSample, TimeRange};
use crate::core::{LabelMap, PulseError, Result, SeriesId};
use crate::metric::StorageMetricType;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SeriesKey {
    metric: String,
    labels: LabelMap,
}

/// DashMap-backed metric store.
pub struct InMemoryStore {
    next_id: AtomicU64,
    series: DashMap<SeriesKey, SeriesId>,
    descriptors: DashMap<SeriesId, SeriesKey>,
    points: DashMap<SeriesId, Vec<(u64, f64)>>,
    registered: DashMap<String, (StorageMetricType, MetricMetadata)>,
    resolve_calls: AtomicU64,
    write_calls: AtomicU64,
    fail_writes: AtomicBool,
    fail_queries: AtomicBool,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            series: DashMap::new(),
            descriptors: DashMap::new(),
            points: DashMap::new(),
            registered: DashMap::new(),
            resolve_calls: AtomicU64::new(0),
            write_calls: AtomicU64::new(0),
            fail_writes: AtomicBool::new(false),
            fail_queries: AtomicBool::new(false),
        }
    }

    /// How many times `resolve_series` hit this backend.
    pub fn resolve_call_count(&self) -> u64 {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// How many times `write_batch` hit this backend.
    pub fn write_call_count(&self) -> u64 {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent `write_batch` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `query_multi` calls fail.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Total stored points across all series.
    pub fn point_count(&self) -> usize {
        self.points.iter().map(|entry| entry.len()).sum()
    }

    /// Number of distinct series.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Stored points for one exact series, if it exists.
    pub fn points_for(&self, metric_name: &str, labels: &LabelMap) -> Option<Vec<(u64, f64)>> {
        let key = SeriesKey {
            metric: metric_name.to_string(),
            labels: labels.clone(),
        };
        let id = *self.series.get(&key)?;
        Some(
            self.points
                .get(&id)
                .map(|entry| entry.value().clone())
                .unwrap_or_default(),
        )
    }

    /// Registered metadata for one metric name, if any.
    pub fn registered_metric(&self, metric_name: &str) -> Option<(StorageMetricType, MetricMetadata)> {
        self.registered
            .get(metric_name)
            .map(|entry| entry.value().clone())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MetricStore for InMemoryStore {
    async fn resolve_series(&self, metric_name: &str, labels: &LabelMap) -> Result<SeriesId> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);

        let key = SeriesKey {
            metric: metric_name.to_string(),
            labels: labels.clone(),
        };
        let id = *self
            .series
            .entry(key.clone())
            .or_insert_with(|| SeriesId::new(self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.descriptors.entry(id).or_insert(key);
        Ok(id)
    }

    async fn write_batch(&self, batch: &[ResolvedSample]) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PulseError::storage("write_batch failure injected"));
        }

        for sample in batch {
            self.points
                .entry(sample.series)
                .or_default()
                .push((sample.timestamp, sample.value));
        }
        Ok(())
    }

    async fn register_metric(
        &self,
        metric_name: &str,
        metric_type: StorageMetricType,
        metadata: MetricMetadata,
    ) -> Result<()> {
        self.registered
            .insert(metric_name.to_string(), (metric_type, metadata));
        Ok(())
    }

    async fn query_multi(
        &self,
        metric_name: &str,
        label_filter: &LabelMap,
        range: TimeRange,
    ) -> Result<Vec<RawSeries>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(PulseError::storage("query_multi failure injected"));
        }

        let mut result = Vec::new();
        for entry in self.descriptors.iter() {
            let (id, key) = (entry.key(), entry.value());
            if key.metric != metric_name {
                continue;
            }
            let matches_filter = label_filter
                .iter()
                .all(|(k, v)| key.labels.get(k) == Some(v));
            if !matches_filter {
                continue;
            }

            let points: Vec<(u64, f64)> = self
                .points
                .get(id)
                .map(|stored| {
                    stored
                        .iter()
                        .filter(|(ts, _)| range.contains(*ts))
                        .copied()
                        .collect()
                })
                .unwrap_or_default();

            result.push(RawSeries {
                labels: key.labels.clone(),
                points,
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn labels(pairs: &[(&str, &str)]) -> LabelMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let store = InMemoryStore::new();
        let tags = labels(&[("method", "GET")]);

        let first = store.resolve_series("app.req.count", &tags).await.unwrap();
        let second = store.resolve_series("app.req.count", &tags).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.resolve_call_count(), 2);
        assert_eq!(store.series_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_labels_get_distinct_series() {
        let store = InMemoryStore::new();
        let get = store
            .resolve_series("app.req.count", &labels(&[("method", "GET")]))
            .await
            .unwrap();
        let post = store
            .resolve_series("app.req.count", &labels(&[("method", "POST")]))
            .await
            .unwrap();
        assert_ne!(get, post);
    }

    #[tokio::test]
    async fn test_concurrent_resolution_converges() {
        let store = Arc::new(InMemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .resolve_series("app.hot.series", &labels(&[("host", "web-1")]))
                    .await
                    .unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_write_and_query_window() {
        let store = InMemoryStore::new();
        let series = store
            .resolve_series("app.vm.memory", &LabelMap::new())
            .await
            .unwrap();
        store
            .write_batch(&[
                ResolvedSample { series, timestamp: 5, value: 1.0 },
                ResolvedSample { series, timestamp: 15, value: 2.0 },
                ResolvedSample { series, timestamp: 25, value: 3.0 },
            ])
            .await
            .unwrap();

        let result = store
            .query_multi("app.vm.memory", &LabelMap::new(), TimeRange { from: 10, to: 20 })
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].points, vec![(15, 2.0)]);
    }

    #[tokio::test]
    async fn test_query_label_filter() {
        let store = InMemoryStore::new();
        let get = store
            .resolve_series("app.req.count", &labels(&[("method", "GET")]))
            .await
            .unwrap();
        let _post = store
            .resolve_series("app.req.count", &labels(&[("method", "POST")]))
            .await
            .unwrap();
        store
            .write_batch(&[ResolvedSample { series: get, timestamp: 1, value: 1.0 }])
            .await
            .unwrap();

        let result = store
            .query_multi(
                "app.req.count",
                &labels(&[("method", "GET")]),
                TimeRange { from: 0, to: 10 },
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].labels, labels(&[("method", "GET")]));
    }

    #[tokio::test]
    async fn test_write_failure_injection() {
        let store = InMemoryStore::new();
        let series = store
            .resolve_series("app.req.count", &LabelMap::new())
            .await
            .unwrap();

        store.set_fail_writes(true);
        let result = store
            .write_batch(&[ResolvedSample { series, timestamp: 1, value: 1.0 }])
            .await;
        assert!(result.is_err());
        assert_eq!(store.point_count(), 0);
        assert_eq!(store.write_call_count(), 1);
    }

    #[tokio::test]
    async fn test_register_metric_metadata() {
        let store = InMemoryStore::new();
        store
            .register_metric(
                "app.req.duration",
                StorageMetricType::Gauge,
                MetricMetadata {
                    unit: Some("millisecond".into()),
                    description: Some("request latency".into()),
                },
            )
            .await
            .unwrap();

        let (kind, meta) = store.registered_metric("app.req.duration").unwrap();
        assert_eq!(kind, StorageMetricType::Gauge);
        assert_eq!(meta.unit.as_deref(), Some("millisecond"));
    }
}
