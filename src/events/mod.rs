//! Event-subscription seam between the instrumented application and the
//! reporter.
//!
//! The reporter only needs `subscribe`/`unsubscribe`; delivery happens
//! synchronously in the emitting task, so a handler's own awaits (e.g. a
//! series-resolution miss) suspend only that producer.

use crate::core::{Measurements, Metadata};
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Opaque token identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receives event occurrences in the producer's own execution context.
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle one event occurrence.
    async fn handle(&self, event_name: &str, measurements: &Measurements, metadata: &Metadata);
}

/// Subscription registry consumed by the reporter.
pub trait EventBus: Send + Sync {
    /// Register a handler for a named event; the same handler may be
    /// subscribed under several event names.
    fn subscribe(&self, event_name: &str, handler: Arc<dyn EventHandler>) -> HandlerId;

    /// Remove a subscription. Returns false if the id was unknown.
    fn unsubscribe(&self, id: HandlerId) -> bool;
}

/// In-process event bus.
///
/// Emission walks the handler list for the event name and awaits each
/// handler sequentially in the emitting task, matching the synchronous
/// delivery contract.
pub struct LocalEventBus {
    handlers: DashMap<String, Vec<(HandlerId, Arc<dyn EventHandler>)>>,
    next_id: AtomicU64,
}

impl LocalEventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Emit one event occurrence to every subscribed handler.
    pub async fn emit(&self, event_name: &str, measurements: &Measurements, metadata: &Metadata) {
        // Clone the handler Arcs out before awaiting; holding a shard guard
        // across an await point would block concurrent subscribers.
        let subscribed: Vec<Arc<dyn EventHandler>> = match self.handlers.get(event_name) {
            Some(entry) => entry.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return,
        };

        for handler in subscribed {
            handler.handle(event_name, measurements, metadata).await;
        }
    }

    /// Number of live subscriptions across all event names.
    pub fn subscription_count(&self) -> usize {
        self.handlers.iter().map(|entry| entry.len()).sum()
    }
}

impl Default for LocalEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for LocalEventBus {
    fn subscribe(&self, event_name: &str, handler: Arc<dyn EventHandler>) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .entry(event_name.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut removed = false;
        for mut entry in self.handlers.iter_mut() {
            let before = entry.len();
            entry.retain(|(hid, _)| *hid != id);
            if entry.len() != before {
                removed = true;
                break;
            }
        }
        removed
    }
}
