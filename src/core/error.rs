use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Storage backend error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Series resolution failed for {metric}: {message}")]
    Resolve { metric: String, message: String },

    #[error("Event subscription error: {0}")]
    Subscription(String),

    #[error("Invalid metric definition: {0}")]
    InvalidDefinition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Async task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type alias for reporter operations
pub type Result<T> = std::result::Result<T, PulseError>;

impl PulseError {
    /// Creates a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new subscription error
    pub fn subscription<S: Into<String>>(msg: S) -> Self {
        Self::Subscription(msg.into())
    }

    /// Creates a new resolution error for the given metric
    pub fn resolve<M: Into<String>, S: Into<String>>(metric: M, msg: S) -> Self {
        Self::Resolve {
            metric: metric.into(),
            message: msg.into(),
        }
    }

    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Storage(_) => true,
            Self::Resolve { .. } => true,
            _ => false,
        }
    }

    /// Returns the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::Resolve { .. } => "resolve",
            Self::Subscription(_) => "subscription",
            Self::InvalidDefinition(_) => "definition",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Join(_) => "async",
        }
    }
}
