//! Error types for the stock request service.

/// Top-level error type for startup and serving.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors. All of these are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Submission store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to append submission: {0}")]
    Append(String),

    #[error("Failed to list submissions: {0}")]
    List(String),
}

/// Outbound notification errors.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Why a submission was rejected before being recorded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingRequiredFields { missing: Vec<&'static str> },

    #[error("Invalid request body")]
    InvalidBody(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
