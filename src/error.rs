//! Error handling for the IoT sensor simulator crate.

/// A specialized `Result` type for simulator operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// The main error type for simulator operations.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Broker connection could not be established or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single message was not accepted for delivery
    #[error("Publish error: {0}")]
    Publish(String),

    /// Durable record log failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid sensor parameters
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SimError {
    /// Create a new connection error
    pub fn connection_error(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a new publish error
    pub fn publish_error(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// Create a new storage error
    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new sensor parameter error
    pub fn sensor_error(msg: impl Into<String>) -> Self {
        Self::Sensor(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
