//! Configuration management utilities
//!
//! [`AppConfig`] carries everything the agent needs to reach the hosted
//! AutoRAG service: credentials, the API base URL and the two knowledge
//! source identifiers. Values come from the environment (see
//! [`AppConfig::from_env`]) or from the builder.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable names read by [`AppConfig::from_env`]
pub mod env {
    pub const ACCOUNT_ID: &str = "AUTORAG_ACCOUNT_ID";
    pub const API_TOKEN: &str = "AUTORAG_API_TOKEN";
    pub const BASE_URL: &str = "AUTORAG_BASE_URL";
    pub const KNOWLEDGE_SOURCE: &str = "AUTORAG_KNOWLEDGE_SOURCE";
    pub const GOVERNANCE_SOURCE: &str = "AUTORAG_GOVERNANCE_SOURCE";
    pub const REQUEST_TIMEOUT_SECS: &str = "AUTORAG_REQUEST_TIMEOUT_SECS";
    pub const LOG_FORMAT: &str = "AUTORAG_LOG_FORMAT";
}

/// Default API base for the hosted AutoRAG service
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Default identifier of the general knowledge source
pub const DEFAULT_KNOWLEDGE_SOURCE: &str = "superbenefit-knowledge";

/// Default identifier of the governance knowledge source
pub const DEFAULT_GOVERNANCE_SOURCE: &str = "superbenefit-governance";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value is absent
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    /// A value is present but unusable
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid {
        key: &'static str,
        reason: String,
    },
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid {
                key: env::LOG_FORMAT,
                reason: format!("unknown log format '{other}'"),
            }),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Account that owns the AutoRAG instances
    pub account_id: Option<String>,

    /// Bearer token for the AutoRAG API
    #[serde(skip_serializing)]
    pub api_token: Option<String>,

    /// API base URL
    pub base_url: String,

    /// General knowledge source identifier
    pub knowledge_source: String,

    /// Governance knowledge source identifier
    pub governance_source: String,

    /// Optional HTTP timeout for oracle requests. `None` imposes no timeout.
    pub request_timeout: Option<Duration>,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            knowledge_source: DEFAULT_KNOWLEDGE_SOURCE.to_string(),
            governance_source: DEFAULT_GOVERNANCE_SOURCE.to_string(),
            request_timeout: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Create a new configuration builder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();
        if let Some(v) = get(env::ACCOUNT_ID) {
            builder = builder.account_id(v);
        }
        if let Some(v) = get(env::API_TOKEN) {
            builder = builder.api_token(v);
        }
        if let Some(v) = get(env::BASE_URL) {
            builder = builder.base_url(v);
        }
        if let Some(v) = get(env::KNOWLEDGE_SOURCE) {
            builder = builder.knowledge_source(v);
        }
        if let Some(v) = get(env::GOVERNANCE_SOURCE) {
            builder = builder.governance_source(v);
        }
        if let Some(v) = get(env::REQUEST_TIMEOUT_SECS) {
            let secs: u64 = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: env::REQUEST_TIMEOUT_SECS,
                reason: format!("'{v}' is not a whole number of seconds"),
            })?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(v) = get(env::LOG_FORMAT) {
            builder = builder.log_format(v.parse()?);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.knowledge_source.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: env::KNOWLEDGE_SOURCE,
                reason: "must not be empty".to_string(),
            });
        }

        if self.governance_source.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: env::GOVERNANCE_SOURCE,
                reason: "must not be empty".to_string(),
            });
        }

        if self.knowledge_source == self.governance_source {
            return Err(ConfigError::Invalid {
                key: env::GOVERNANCE_SOURCE,
                reason: "must differ from the knowledge source".to_string(),
            });
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid {
                key: env::REQUEST_TIMEOUT_SECS,
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Account id and token, required before any remote search is issued
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let account = self
            .account_id
            .as_deref()
            .ok_or(ConfigError::Missing(env::ACCOUNT_ID))?;
        let token = self
            .api_token
            .as_deref()
            .ok_or(ConfigError::Missing(env::API_TOKEN))?;
        Ok((account, token))
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    account_id: Option<String>,
    api_token: Option<String>,
    base_url: Option<String>,
    knowledge_source: Option<String>,
    governance_source: Option<String>,
    request_timeout: Option<Duration>,
    log_format: Option<LogFormat>,
}

impl AppConfigBuilder {
    /// Set the account id
    pub fn account_id(mut self, id: impl Into<String>) -> Self {
        self.account_id = Some(id.into());
        self
    }

    /// Set the API token
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the general knowledge source identifier
    pub fn knowledge_source(mut self, source: impl Into<String>) -> Self {
        self.knowledge_source = Some(source.into());
        self
    }

    /// Set the governance knowledge source identifier
    pub fn governance_source(mut self, source: impl Into<String>) -> Self {
        self.governance_source = Some(source.into());
        self
    }

    /// Set the oracle request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the log format
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();

        let config = AppConfig {
            account_id: self.account_id,
            api_token: self.api_token,
            base_url: self.base_url.unwrap_or(defaults.base_url),
            knowledge_source: self.knowledge_source.unwrap_or(defaults.knowledge_source),
            governance_source: self.governance_source.unwrap_or(defaults.governance_source),
            request_timeout: self.request_timeout,
            log_format: self.log_format.unwrap_or(defaults.log_format),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.knowledge_source, "superbenefit-knowledge");
        assert_eq!(config.governance_source, "superbenefit-governance");
        assert!(config.request_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (env::ACCOUNT_ID, "acct"),
            (env::API_TOKEN, "token"),
            (env::REQUEST_TIMEOUT_SECS, "30"),
            (env::LOG_FORMAT, "json"),
            (env::KNOWLEDGE_SOURCE, ""),
        ]))
        .unwrap();

        assert_eq!(config.credentials().unwrap(), ("acct", "token"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.log_format, LogFormat::Json);
        // empty values fall back to defaults
        assert_eq!(config.knowledge_source, DEFAULT_KNOWLEDGE_SOURCE);
    }

    #[test]
    fn test_invalid_timeout() {
        let result = AppConfig::from_lookup(lookup_from(&[(env::REQUEST_TIMEOUT_SECS, "soon")]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        let result = AppConfig::builder()
            .request_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_sources_must_differ() {
        let result = AppConfig::builder()
            .knowledge_source("docs")
            .governance_source("docs")
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_missing_credentials() {
        let config = AppConfig::default();
        assert_eq!(
            config.credentials().unwrap_err(),
            ConfigError::Missing(env::ACCOUNT_ID)
        );
    }

    #[test]
    fn test_token_not_serialized() {
        let config = AppConfig::builder().api_token("secret").build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
