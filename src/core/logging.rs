//! Logging initialization for embedders that don't bring their own
//! subscriber.

use crate::core::{PulseError, Result};

/// Initialize tracing output for the reporter.
///
/// Respects `RUST_LOG` when set; otherwise falls back to `PULSE_LOG_LEVEL`
/// or `info`. Returns an error if a global subscriber is already installed.
pub fn init_logging(debug: bool) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_log_level = std::env::var("PULSE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_level = if debug { "debug" } else { env_log_level.as_str() };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| PulseError::config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}
