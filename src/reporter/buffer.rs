//! Concurrent write buffer for pending samples.

use crate::core::SeriesId;
use crate::storage::ResolvedSample;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Append-only accumulator of samples awaiting the next flush.
///
/// Each insert is keyed by a process-unique token, so concurrent producers
/// sharing a series id and timestamp never overwrite each other. Entries
/// are write-once, read-once: `drain` consumes them. The token counter
/// guarantees collision-free keys; no lock is shared across producers.
pub struct WriteBuffer {
    entries: DashMap<u64, ResolvedSample>,
    next_token: AtomicU64,
}

impl WriteBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_token: AtomicU64::new(0),
        }
    }

    /// Record one sample. Never blocks on other producers.
    pub fn record(&self, series: SeriesId, timestamp: u64, value: f64) {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            token,
            ResolvedSample {
                series,
                timestamp,
                value,
            },
        );
    }

    /// Remove and return every sample present at the drain point.
    ///
    /// Callers serialize drains (the flush mutex); samples recorded while a
    /// drain runs simply land in the next batch. A given sample is returned
    /// by exactly one drain.
    pub fn drain(&self) -> Vec<ResolvedSample> {
        let tokens: Vec<u64> = self.entries.iter().map(|entry| *entry.key()).collect();
        tokens
            .into_iter()
            .filter_map(|token| self.entries.remove(&token).map(|(_, sample)| sample))
            .collect()
    }

    /// Number of samples awaiting flush.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer holds no pending samples.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
