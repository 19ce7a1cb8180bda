//! Configuration management for bili2vrc
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use bili2vrc::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Parsing endpoint: {}", config.endpoints.parsing_url);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `BILI2VRC__<section>__<key>`
//!
//! Examples:
//! - `BILI2VRC__PARSING__COOLDOWN=10s`
//! - `BILI2VRC__ENDPOINTS__PARSING_URL=http://localhost:8080/bparse/`
//! - `BILI2VRC__STORE__FJALL_PATH=/var/lib/bili2vrc`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/bili2vrc.toml`.
//! This can be overridden using the `BILI2VRC_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use crate::humanize::DurationSpec;
pub use models::{
    Config, EndpointsConfig, HttpConfig, ParsingConfig, StoreConfig, TelemetryConfig,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`BILI2VRC__*`)
    /// 2. TOML file (default: `config/bili2vrc.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a value
    /// fails validation (bad endpoint scheme, zero duration, ...).
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Validate an already-built configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)?;
        Ok(())
    }
}
