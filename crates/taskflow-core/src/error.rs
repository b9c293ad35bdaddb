use thiserror::Error;

/// Top-level error type for TaskFlow.
#[derive(Debug, Error)]
pub enum TaskFlowError {
    /// Error from the record/document store.
    #[error("store error: {0}")]
    Store(String),

    /// Error from the notification boundary.
    #[error("notify error: {0}")]
    Notify(String),

    /// Malformed directive input.
    #[error("directive error: {0}")]
    Directive(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
