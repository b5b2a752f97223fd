//! Reporter lifecycle: event capture, buffering, and batched persistence.
//!
//! A [`Reporter`] owns the series cache, the write buffer, and the flush
//! scheduler for exactly as long as it runs. Any number of producer tasks
//! may emit events concurrently; only a cache miss or a batch write ever
//! suspends anyone, and each suspends only its own caller.

pub mod buffer;
pub mod cache;
pub mod router;
pub mod scheduler;

pub use buffer::WriteBuffer;
pub use cache::SeriesCache;
pub use router::EventRouter;
pub use scheduler::FlushScheduler;

use crate::core::{ReporterConfig, Result};
use crate::events::{EventBus, HandlerId};
use crate::metric::MetricDefinition;
use crate::storage::{MetricMetadata, MetricStore};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Running telemetry reporter.
///
/// Create with [`Reporter::start`]; shut down with [`Reporter::stop`],
/// which unsubscribes from the event bus before the terminal flush so no
/// sample arrives after the last drain.
pub struct Reporter {
    config: ReporterConfig,
    bus: Arc<dyn EventBus>,
    buffer: Arc<WriteBuffer>,
    scheduler: Arc<FlushScheduler>,
    subscriptions: Vec<HandlerId>,
    shutdown_tx: watch::Sender<bool>,
    periodic: Option<JoinHandle<()>>,
}

impl Reporter {
    /// Start a reporter: register metric metadata, subscribe to every
    /// distinct event name among the definitions, and spawn the periodic
    /// flush when an interval is configured.
    pub async fn start(
        config: ReporterConfig,
        store: Arc<dyn MetricStore>,
        bus: Arc<dyn EventBus>,
        definitions: Vec<MetricDefinition>,
    ) -> Result<Self> {
        config.validate()?;

        let definitions: Vec<Arc<MetricDefinition>> =
            definitions.into_iter().map(Arc::new).collect();

        // Metric metadata registration is best-effort: telemetry must not
        // abort the embedding application.
        for definition in &definitions {
            let metric_name = definition.storage_name(&config.prefix);
            let metadata = MetricMetadata {
                unit: definition
                    .unit_spec()
                    .stored_unit()
                    .map(|u| u.symbol().to_string()),
                description: definition.description().map(str::to_string),
            };
            if let Err(err) = store
                .register_metric(&metric_name, definition.kind().storage_type(), metadata)
                .await
            {
                tracing::warn!(metric = %metric_name, error = %err, "metric registration failed");
            }
        }

        let cache = Arc::new(SeriesCache::new(Arc::clone(&store)));
        let buffer = Arc::new(WriteBuffer::new());
        let scheduler = Arc::new(FlushScheduler::new(Arc::clone(&buffer), store));
        let router = Arc::new(EventRouter::new(
            definitions,
            &config.prefix,
            cache,
            Arc::clone(&buffer),
        ));

        let event_names: Vec<String> =
            router.event_names().map(str::to_string).collect();
        let mut subscriptions = Vec::with_capacity(event_names.len());
        for event_name in &event_names {
            subscriptions.push(bus.subscribe(event_name, router.clone()));
        }
        tracing::info!(
            events = event_names.len(),
            flush_interval = ?config.flush_interval,
            "reporter started"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let periodic = if config.flush_interval.is_zero() {
            None
        } else {
            Some(scheduler.spawn_periodic(config.flush_interval, shutdown_rx))
        };

        Ok(Self {
            config,
            bus,
            buffer,
            scheduler,
            subscriptions,
            shutdown_tx,
            periodic,
        })
    }

    /// Drain the buffer and complete the backend write before returning.
    pub async fn flush(&self) {
        self.scheduler.flush().await;
    }

    /// Number of samples currently awaiting flush.
    pub fn pending_samples(&self) -> usize {
        self.buffer.len()
    }

    /// The configuration this reporter runs with.
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Stop the reporter: unsubscribe, stop the periodic task, then flush
    /// whatever is still buffered.
    pub async fn stop(mut self) {
        // Unsubscribe first so no new sample lands during the final drain
        for id in self.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }

        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.periodic.take() {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "periodic flush task ended abnormally");
            }
        }

        self.scheduler.flush().await;
        tracing::info!("reporter stopped");
    }
}
