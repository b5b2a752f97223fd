//! Configuration for the telemetry reporter.
//!
//! This module provides configuration handling with:
//! - Serde support for embedding in larger config files
//! - Builder API for programmatic construction
//! - Validation and sensible defaults

use crate::core::{PulseError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete configuration for a reporter instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Prefix prepended (dot-joined) to every metric name
    pub prefix: String,
    /// Interval between periodic flushes; zero disables the periodic
    /// flush entirely and leaves draining to explicit `flush()` calls
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
    /// How far back `history` queries reach
    #[serde(with = "humantime_serde")]
    pub history_window: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            prefix: "app".to_string(),
            flush_interval: Duration::from_secs(5),
            history_window: Duration::from_secs(30 * 60),
        }
    }
}

impl ReporterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(PulseError::config("prefix cannot be empty"));
        }
        if self.prefix.contains(char::is_whitespace) {
            return Err(PulseError::config(format!(
                "prefix cannot contain whitespace: {:?}",
                self.prefix
            )));
        }
        if self.history_window.is_zero() {
            return Err(PulseError::config("history window must be positive"));
        }
        Ok(())
    }
}

/// Builder for `ReporterConfig`
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: ReporterConfig,
}

impl ConfigBuilder {
    /// Create a builder starting from defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metric name prefix.
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Set the periodic flush interval (zero disables periodic flushing).
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// Set the history query window.
    pub fn history_window(mut self, window: Duration) -> Self {
        self.config.history_window = window;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ReporterConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
