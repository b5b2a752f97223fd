//! History reconstruction for display layers.
//!
//! Collapses the backend's raw multi-series answer into display-labelled,
//! timestamp-sorted points: series whose labels project onto the same
//! display label merge, and values colliding on the same second are
//! replaced by their arithmetic mean.

use crate::core::{unix_now_seconds, LabelMap, ReporterConfig};
use crate::metric::MetricDefinition;
use crate::storage::{MetricStore, RawSeries, TimeRange};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// One display-ready point.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    /// Collapsed display label ("" when the definition declares no tags)
    pub label: String,
    /// Unix timestamp in microseconds
    pub timestamp_micros: u64,
    /// Point value (mean of colliding raw values)
    pub value: f64,
}

/// Query options for [`history`].
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Metric name prefix, matching the reporter configuration
    pub prefix: String,
    /// How far back to query
    pub window: Duration,
}

impl From<&ReporterConfig> for HistoryOptions {
    fn from(config: &ReporterConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            window: config.history_window,
        }
    }
}

/// Query and aggregate the recent history of one metric definition.
///
/// A backend failure or an unknown metric yields an empty vec, never an
/// error: the display layer renders "no data" rather than crashing.
pub async fn history(
    definition: &MetricDefinition,
    store: &dyn MetricStore,
    options: &HistoryOptions,
) -> Vec<HistoryPoint> {
    let metric_name = definition.storage_name(&options.prefix);
    let now = unix_now_seconds();
    let range = TimeRange {
        from: now.saturating_sub(options.window.as_secs()),
        to: now,
    };

    match store.query_multi(&metric_name, &LabelMap::new(), range).await {
        Ok(series) => aggregate(definition, series),
        Err(err) => {
            tracing::warn!(metric = %metric_name, error = %err, "history query failed");
            Vec::new()
        },
    }
}

/// Collapse raw series into display points.
///
/// Ordering across labels is unspecified; within one label the points are
/// strictly ascending by time.
pub fn aggregate(definition: &MetricDefinition, series: Vec<RawSeries>) -> Vec<HistoryPoint> {
    // label -> timestamp_seconds -> (sum, count); BTreeMap keeps the
    // per-label timeline sorted while collisions accumulate
    let mut grouped: HashMap<String, BTreeMap<u64, (f64, u32)>> = HashMap::new();

    for raw in series {
        let label = display_label(definition, &raw.labels);
        let timeline = grouped.entry(label).or_default();
        for (timestamp, value) in raw.points {
            let (sum, count) = timeline.entry(timestamp).or_insert((0.0, 0));
            *sum += value;
            *count += 1;
        }
    }

    let mut points = Vec::new();
    for (label, timeline) in grouped {
        for (timestamp, (sum, count)) in timeline {
            points.push(HistoryPoint {
                label: label.clone(),
                timestamp_micros: timestamp * 1_000_000,
                value: sum / f64::from(count),
            });
        }
    }
    points
}

/// Project a series' labels onto the definition's declared tags, in tag
/// order, joined by single spaces. Tags with empty values are skipped; no
/// declared tags means every series collapses onto the empty label.
fn display_label(definition: &MetricDefinition, labels: &LabelMap) -> String {
    definition
        .tag_keys()
        .iter()
        .filter_map(|tag| labels.get(tag))
        .filter(|value| !value.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}
