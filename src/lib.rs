//! Pulse - embedded telemetry reporter with batched time-series persistence.
//!
//! Pulse captures high-frequency instrumentation events emitted by a running
//! application, converts them into time-series samples according to
//! declarative metric definitions, and persists them in batches to a
//! pluggable storage backend. It also reconstructs label-grouped history
//! for display layers.
//!
//! # Features
//!
//! - **Declarative Metrics**: counters, sums, last values, summaries and
//!   distributions derived from named events
//! - **Lock-free Hot Path**: producers share no exclusive lock; only a
//!   first-time series resolution may suspend a producer
//! - **Batched Writes**: a self-rescheduling flush drains the buffer into
//!   one backend write per cycle
//! - **History Aggregation**: collapses series onto display labels and
//!   averages timestamp collisions
//!
//! # Architecture
//!
//! - `metric`: metric definitions and unit conversion
//! - `events`: the event-subscription seam
//! - `reporter`: cache, buffer, router and flush scheduler
//! - `storage`: backend trait and in-memory implementation
//! - `history`: display-side aggregation
//!
//! # Example
//!
//! ```no_run
//! use pulse_lib::core::ConfigBuilder;
//! use pulse_lib::events::LocalEventBus;
//! use pulse_lib::metric::{MetricDefinition, Unit};
//! use pulse_lib::storage::InMemoryStore;
//! use pulse_lib::Reporter;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigBuilder::new().prefix("web").build()?;
//!     let store = Arc::new(InMemoryStore::new());
//!     let bus = Arc::new(LocalEventBus::new());
//!
//!     let definitions = vec![
//!         MetricDefinition::summary("http.request.duration")
//!             .unit(Unit::Native.to(Unit::Millisecond))
//!             .tags(["method"]),
//!     ];
//!
//!     let reporter = Reporter::start(config, store, bus, definitions).await?;
//!     // ... application emits events through the bus ...
//!     reporter.stop().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod core;
pub mod events;
pub mod history;
pub mod metric;
pub mod reporter;
pub mod storage;

// Re-export core types for convenience
pub use crate::core::{PulseError, ReporterConfig, Result};
pub use crate::history::{history, HistoryOptions, HistoryPoint};
pub use crate::metric::MetricDefinition;
pub use crate::reporter::Reporter;
