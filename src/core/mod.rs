//! Core domain models and shared infrastructure for the reporter.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigBuilder, ReporterConfig};
pub use error::{PulseError, Result};
pub use types::{
    render_tag_value, unix_now_seconds, LabelMap, Measurements, Metadata, SeriesId,
};
