//! Shared utilities for autorag-agent
//!
//! This crate provides the pieces every other crate in the workspace leans on:
//! tracing setup and the application configuration loaded from the environment.

pub mod config;
pub mod logging;

pub use config::{AppConfig, AppConfigBuilder, ConfigError, LogFormat};
pub use logging::{init_tracing, init_tracing_with_format};
