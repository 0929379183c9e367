//! Configuration error types

use thiserror::Error;

use crate::adapters::outbox::PublisherConfigError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Pool acquire timeout must be at least one second")]
    InvalidAcquireTimeout,

    #[error("Invalid log filter '{0}'")]
    InvalidLogLevel(String),

    #[error("Invalid publisher settings: {0}")]
    Publisher(#[from] PublisherConfigError),
}
