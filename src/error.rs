//! Error types for the Cache Storage Operator

/// Result type for the operator
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the operator
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transient Kubernetes API error (network failure, conflict, server error)
    #[error("Kubernetes API error: {0}")]
    KubeError(String),
    /// Object disappeared between read and write
    #[error("Resource not found: {0}")]
    NotFound(String),
    /// Configuration error (annotations, environment)
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Whether retrying the same reconciliation may succeed without a spec change
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::KubeError(_) | Error::NotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}
