//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Skip token list must not be empty")]
    NoSkipTokens,

    #[error("Spike delta threshold must be within (0, 100]")]
    InvalidDeltaThreshold,

    #[error("{0} must be at least one day")]
    InvalidWindow(&'static str),

    #[error("Aggregator merge attempts must be at least 1")]
    InvalidMergeAttempts,
}
