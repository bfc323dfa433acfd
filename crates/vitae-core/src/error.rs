use thiserror::Error;

/// Top-level error type for Vitae.
#[derive(Debug, Error)]
pub enum VitaeError {
    /// The incoming chat message was rejected before reaching any provider.
    #[error("validation error: {0}")]
    Validation(String),

    /// Error from the profile/transcript store.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Error constructing or configuring an AI provider.
    #[error("provider error: {0}")]
    Provider(String),

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
