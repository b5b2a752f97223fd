//! Common test utilities and fixtures.

use pulse_lib::core::{ConfigBuilder, LabelMap, Measurements, Metadata, ReporterConfig};
use pulse_lib::events::LocalEventBus;
use pulse_lib::storage::InMemoryStore;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Reporter configuration for deterministic tests: manual flushing only.
pub fn manual_flush_config(prefix: &str) -> ReporterConfig {
    ConfigBuilder::new()
        .prefix(prefix)
        .flush_interval(Duration::ZERO)
        .history_window(Duration::from_secs(3600))
        .build()
        .unwrap()
}

/// Fresh store/bus pair for a test reporter.
pub fn test_backend() -> (Arc<InMemoryStore>, Arc<LocalEventBus>) {
    (Arc::new(InMemoryStore::new()), Arc::new(LocalEventBus::new()))
}

/// Build a measurements map from key/value pairs.
pub fn measurements(pairs: &[(&str, f64)]) -> Measurements {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Build a metadata map from key/JSON-value pairs.
pub fn metadata(pairs: &[(&str, Value)]) -> Metadata {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Build a label map from key/value pairs.
pub fn labels(pairs: &[(&str, &str)]) -> LabelMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
