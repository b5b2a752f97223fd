//! Periodic and on-demand flushing of the write buffer.

use super::buffer::WriteBuffer;
use crate::storage::MetricStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Drains the write buffer and issues batched writes.
///
/// All drains go through one mutex: an explicit flush never overlaps a
/// periodic one, so a sample is consumed by exactly one batch. Failed
/// batches are reported and dropped, never retried or re-buffered.
pub struct FlushScheduler {
    buffer: Arc<WriteBuffer>,
    store: Arc<dyn MetricStore>,
    drain_lock: Mutex<()>,
}

impl FlushScheduler {
    /// Create a scheduler over the given buffer and backend.
    pub fn new(buffer: Arc<WriteBuffer>, store: Arc<dyn MetricStore>) -> Self {
        Self {
            buffer,
            store,
            drain_lock: Mutex::new(()),
        }
    }

    /// Drain pending samples and write them as one batch.
    ///
    /// An empty buffer performs no backend call. Returns once the backend
    /// write (if any) has completed.
    pub async fn flush(&self) {
        let _guard = self.drain_lock.lock().await;

        let batch = self.buffer.drain();
        if batch.is_empty() {
            return;
        }

        tracing::trace!(samples = batch.len(), "flushing sample batch");
        if let Err(err) = self.store.write_batch(&batch).await {
            tracing::error!(
                samples = batch.len(),
                error = %err,
                "batch write failed, samples dropped"
            );
        }
    }

    /// Spawn the periodic flush task.
    ///
    /// The timer re-arms only after the previous flush completes, so a slow
    /// backend stretches the period instead of stacking flushes. Stops when
    /// the shutdown channel fires.
    pub fn spawn_periodic(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        scheduler.flush().await;
                    }
                    _ = shutdown.changed() => {
                        break;
                    }
                }
            }
        })
    }
}
