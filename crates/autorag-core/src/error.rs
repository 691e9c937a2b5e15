//! Error types for autorag-core

use thiserror::Error;

/// Result type alias for autorag-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tool and agent operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Arguments did not satisfy a tool's input schema
    #[error("Invalid input for tool '{tool}': {reason}")]
    Validation { tool: String, reason: String },

    /// An approved tool has no confirmed executor registered
    #[error("No execute function found on tool '{0}'")]
    MissingExecutor(String),

    /// The model asked for a tool that is not registered
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// An outbound call (search oracle, scheduler) failed
    #[error("Remote operation failed: {0}")]
    RemoteOperation(String),

    /// Invalid wiring of tools or collaborators
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A tool executor ran and failed
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    /// Generic error message
    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// Build a validation error for `tool`
    pub fn validation(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("searchKnowledge", "missing field `query`");
        assert_eq!(
            err.to_string(),
            "Invalid input for tool 'searchKnowledge': missing field `query`"
        );

        let err = Error::MissingExecutor("getWeatherInformation".to_string());
        assert_eq!(
            err.to_string(),
            "No execute function found on tool 'getWeatherInformation'"
        );

        assert_eq!(
            Error::UnknownTool("nope".to_string()).to_string(),
            "Tool not found: nope"
        );
    }
}
