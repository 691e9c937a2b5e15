//! Error types for knowledge-source search

use thiserror::Error;

/// Failures talking to the AutoRAG oracle
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The oracle answered with an error
    #[error("AutoRAG API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The oracle answered with something we could not parse
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Request parameters outside the oracle's accepted ranges
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    /// Missing credentials or a malformed base URL
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl From<SearchError> for autorag_core::Error {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Configuration(msg) => autorag_core::Error::Configuration(msg),
            other => autorag_core::Error::RemoteOperation(other.to_string()),
        }
    }
}

impl From<autorag_utils::ConfigError> for SearchError {
    fn from(err: autorag_utils::ConfigError) -> Self {
        SearchError::Configuration(err.to_string())
    }
}
