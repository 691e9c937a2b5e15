//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors a model driver can report
#[derive(Error, Debug)]
pub enum LLMError {
    /// Request to the model failed
    #[error("Model request failed: {0}")]
    RequestFailed(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The model answered with something we cannot interpret
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}
