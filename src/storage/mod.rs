//! Time-series storage interface.
//!
//! The actual storage engine is external; this module defines the trait the
//! reporter writes through and the in-memory implementation used by tests
//! and in-process embedders.

use crate::core::{LabelMap, SeriesId};

pub mod backend;
pub mod memory;

// Re-export commonly used types
pub use backend::MetricStore;
pub use memory::InMemoryStore;

/// One pre-resolved sample inside a flush batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSample {
    /// Target series
    pub series: SeriesId,
    /// Unix timestamp in whole seconds
    pub timestamp: u64,
    /// Converted measurement value
    pub value: f64,
}

/// One raw series returned by a multi-series query.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    /// Full label set of the series
    pub labels: LabelMap,
    /// `(timestamp_seconds, value)` points within the queried window
    pub points: Vec<(u64, f64)>,
}

/// Inclusive unix-seconds query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Window start (inclusive)
    pub from: u64,
    /// Window end (inclusive)
    pub to: u64,
}

impl TimeRange {
    /// Whether a timestamp falls inside the window.
    pub fn contains(&self, timestamp: u64) -> bool {
        timestamp >= self.from && timestamp <= self.to
    }
}

/// Metric-level metadata registered alongside a metric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricMetadata {
    /// Unit symbol the stored values are expressed in
    pub unit: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
}
