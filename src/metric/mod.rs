//! Declarative metric model: definitions and unit conversion.

pub mod convert;
pub mod definition;

pub use convert::{convert, NATIVE_TICKS_PER_SECOND};
pub use definition::{MetricDefinition, MetricKind, StorageMetricType, Unit, UnitSpec, ValueSource};
