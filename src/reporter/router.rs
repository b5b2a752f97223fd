//! Event-to-sample routing.

use super::buffer::WriteBuffer;
use super::cache::SeriesCache;
use crate::core::{unix_now_seconds, Measurements, Metadata};
use crate::events::EventHandler;
use crate::metric::{convert, MetricDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// One definition plus its precomputed storage-facing metric name.
struct RoutedDefinition {
    definition: Arc<MetricDefinition>,
    metric_name: String,
}

/// Evaluates every registered definition against incoming events.
///
/// One router instance serves all event names; it is subscribed once per
/// distinct event name among its definitions. Definitions sharing an event
/// name are evaluated independently on the same occurrence, in registration
/// order (the order never affects what gets written).
pub struct EventRouter {
    groups: HashMap<String, Vec<RoutedDefinition>>,
    cache: Arc<SeriesCache>,
    buffer: Arc<WriteBuffer>,
}

impl EventRouter {
    /// Group definitions by event name and precompute metric names.
    pub fn new(
        definitions: Vec<Arc<MetricDefinition>>,
        prefix: &str,
        cache: Arc<SeriesCache>,
        buffer: Arc<WriteBuffer>,
    ) -> Self {
        let mut groups: HashMap<String, Vec<RoutedDefinition>> = HashMap::new();
        for definition in definitions {
            let metric_name = definition.storage_name(prefix);
            groups
                .entry(definition.event_name().to_string())
                .or_default()
                .push(RoutedDefinition {
                    definition,
                    metric_name,
                });
        }
        Self {
            groups,
            cache,
            buffer,
        }
    }

    /// Distinct event names the router wants subscriptions for.
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    async fn apply(
        &self,
        routed: &RoutedDefinition,
        measurements: &Measurements,
        metadata: &Metadata,
    ) {
        let definition = &routed.definition;

        if !definition.keeps(metadata) {
            return;
        }
        let Some(raw) = definition.extract(measurements, metadata) else {
            return;
        };
        let value = convert(raw, definition.unit_spec());
        let labels = definition.label_map(metadata);

        // A failed resolution drops only this sample; the producer's task
        // must never see the error.
        match self.cache.resolve(&routed.metric_name, &labels).await {
            Ok(series) => self.buffer.record(series, unix_now_seconds(), value),
            Err(err) => {
                tracing::debug!(
                    metric = %routed.metric_name,
                    error = %err,
                    "series resolution failed, sample dropped"
                );
            },
        }
    }
}

#[async_trait::async_trait]
impl EventHandler for EventRouter {
    async fn handle(&self, event_name: &str, measurements: &Measurements, metadata: &Metadata) {
        let Some(group) = self.groups.get(event_name) else {
            return;
        };
        for routed in group {
            self.apply(routed, measurements, metadata).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::Unit;
    use crate::storage::InMemoryStore;
    use serde_json::json;

    fn router_over(
        definitions: Vec<MetricDefinition>,
    ) -> (EventRouter, Arc<InMemoryStore>, Arc<WriteBuffer>) {
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(SeriesCache::new(store.clone()));
        let buffer = Arc::new(WriteBuffer::new());
        let router = EventRouter::new(
            definitions.into_iter().map(Arc::new).collect(),
            "app",
            cache,
            Arc::clone(&buffer),
        );
        (router, store, buffer)
    }

    #[tokio::test]
    async fn test_fanout_evaluates_each_definition_independently() {
        let (router, _store, buffer) = router_over(vec![
            MetricDefinition::counter("http.request.count").value_with(|_, _| Some(1.0)),
            MetricDefinition::summary("http.request.duration"),
        ]);

        let mut measurements = Measurements::new();
        measurements.insert("duration".into(), 42.0);
        router
            .handle("http.request", &measurements, &Metadata::new())
            .await;

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_measurement_skips_only_that_definition() {
        let (router, _store, buffer) = router_over(vec![
            MetricDefinition::summary("http.request.duration"),
            MetricDefinition::counter("http.request.count").value_with(|_, _| Some(1.0)),
        ]);

        // No "duration" measurement: the summary skips, the counter fires
        router
            .handle("http.request", &Measurements::new(), &Metadata::new())
            .await;

        assert_eq!(buffer.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_keep_predicate_filters_per_definition() {
        let (router, _store, buffer) = router_over(vec![
            MetricDefinition::counter("http.request.count")
                .value_with(|_, _| Some(1.0))
                .keep(|meta| meta.get("route").map(|r| r != "/health").unwrap_or(true)),
            MetricDefinition::counter("http.request.all").value_with(|_, _| Some(1.0)),
        ]);

        let mut metadata = Metadata::new();
        metadata.insert("route".into(), json!("/health"));
        router
            .handle("http.request", &Measurements::new(), &metadata)
            .await;

        assert_eq!(buffer.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_unit_conversion_applied_before_buffering() {
        let (router, _store, buffer) = router_over(vec![
            MetricDefinition::summary("http.request.duration").unit(Unit::Native.to(Unit::Millisecond)),
        ]);

        let mut measurements = Measurements::new();
        measurements.insert("duration".into(), 100_000_000.0);
        router
            .handle("http.request", &measurements, &Metadata::new())
            .await;

        let drained = buffer.drain();
        assert_eq!(drained.len(), 1);
        assert!((drained[0].value - 100.0).abs() <= 1.0);
    }

    #[tokio::test]
    async fn test_labels_split_series() {
        let (router, store, buffer) = router_over(vec![
            MetricDefinition::counter("http.request.count")
                .value_with(|_, _| Some(1.0))
                .tags(["method"]),
        ]);

        for method in ["GET", "POST", "GET"] {
            let mut metadata = Metadata::new();
            metadata.insert("method".into(), json!(method));
            router
                .handle("http.request", &Measurements::new(), &metadata)
                .await;
        }

        assert_eq!(buffer.drain().len(), 3);
        assert_eq!(store.series_count(), 2);
        // Third occurrence was a cache hit
        assert_eq!(store.resolve_call_count(), 2);
    }

    #[tokio::test]
    async fn test_unmatched_event_is_ignored() {
        let (router, _store, buffer) = router_over(vec![
            MetricDefinition::counter("http.request.count").value_with(|_, _| Some(1.0)),
        ]);

        router
            .handle("db.query", &Measurements::new(), &Metadata::new())
            .await;
        assert!(buffer.is_empty());
    }
}
