//! Storage backend trait.

use super::{MetricMetadata, RawSeries, ResolvedSample, TimeRange};
use crate::core::{LabelMap, Result, SeriesId};
use crate::metric::StorageMetricType;

/// Trait for time-series storage backend implementations.
///
/// `resolve_series` must be idempotent: the same metric name and label set
/// always map to the same id. The series cache relies on that to tolerate
/// duplicate concurrent resolutions without locking.
#[async_trait::async_trait]
pub trait MetricStore: Send + Sync {
    /// Map a metric name plus label set to its series id, creating the
    /// series if needed.
    async fn resolve_series(&self, metric_name: &str, labels: &LabelMap) -> Result<SeriesId>;

    /// Persist one batch of pre-resolved samples.
    async fn write_batch(&self, batch: &[ResolvedSample]) -> Result<()>;

    /// Register metric-level metadata (type, unit, description).
    async fn register_metric(
        &self,
        metric_name: &str,
        metric_type: StorageMetricType,
        metadata: MetricMetadata,
    ) -> Result<()>;

    /// Query all series matching a metric name and label filter within a
    /// time window.
    async fn query_multi(
        &self,
        metric_name: &str,
        label_filter: &LabelMap,
        range: TimeRange,
    ) -> Result<Vec<RawSeries>>;
}
