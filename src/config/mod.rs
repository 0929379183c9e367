//! Outbox configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! (and optionally a file) using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `OUTBOX` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use event_outbox::config::OutboxConfig;
//!
//! let config = OutboxConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let options = config.publisher_options().expect("Invalid publisher settings");
//! ```

mod database;
mod error;
mod logging;
mod publisher;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use publisher::PublisherSettings;

use std::path::Path;

use serde::Deserialize;

use crate::adapters::outbox::PublisherOptions;

const ENV_PREFIX: &str = "OUTBOX";

/// Root outbox configuration
///
/// Load using [`OutboxConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutboxConfig {
    /// Database configuration; absent when an executor is supplied in code
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Publisher configuration (table, batching, retries)
    #[serde(default)]
    pub publisher: PublisherSettings,

    /// Logging configuration (filter, format)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OutboxConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `OUTBOX` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `OUTBOX__PUBLISHER__BATCH_SIZE=50` -> `publisher.batch_size = 50`
    /// - `OUTBOX__DATABASE__URL=...` -> `database.url = ...`
    /// - `OUTBOX__PUBLISHER__ALLOWED_TABLES=a,b` -> `publisher.allowed_tables = ["a", "b"]`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a file, with environment variables taking precedence
    ///
    /// The format is inferred from the extension (`.toml`, `.yaml`, `.json`, ...).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(true))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.publisher.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Publisher options derived from the `publisher` section
    pub fn publisher_options(&self) -> Result<PublisherOptions, ConfigError> {
        self.publisher
            .to_options()
            .map_err(|e| ConfigError::ValidationFailed(e.into()))
    }
}

fn environment() -> config::Environment {
    config::Environment::default()
        .prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("publisher.allowed_tables")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbox::{PlaceholderStyle, PublisherConfig};
    use secrecy::ExposeSecret;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "OUTBOX__DATABASE__URL",
        "OUTBOX__DATABASE__MAX_CONNECTIONS",
        "OUTBOX__DATABASE__RUN_MIGRATIONS",
        "OUTBOX__PUBLISHER__TABLE_NAME",
        "OUTBOX__PUBLISHER__BATCH_SIZE",
        "OUTBOX__PUBLISHER__MAX_RETRIES",
        "OUTBOX__PUBLISHER__PLACEHOLDER_STYLE",
        "OUTBOX__PUBLISHER__ALLOWED_TABLES",
        "OUTBOX__LOGGING__LEVEL",
        "OUTBOX__LOGGING__FORMAT",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = OutboxConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.database.is_none());
        assert_eq!(config.publisher.table_name, "outbox_message");
        assert_eq!(config.publisher.batch_size, 100);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("OUTBOX__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("OUTBOX__PUBLISHER__TABLE_NAME", "public.events");
        env::set_var("OUTBOX__PUBLISHER__BATCH_SIZE", "25");
        env::set_var("OUTBOX__PUBLISHER__MAX_RETRIES", "0");
        env::set_var("OUTBOX__PUBLISHER__PLACEHOLDER_STYLE", "question");
        env::set_var("OUTBOX__LOGGING__FORMAT", "json");
        let result = OutboxConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.database.as_ref().unwrap().url.expose_secret(),
            "postgresql://test@localhost/test"
        );
        assert_eq!(config.publisher.table_name, "public.events");
        assert_eq!(config.publisher.batch_size, 25);
        assert_eq!(config.publisher.max_retries, 0);
        assert_eq!(config.publisher.placeholder_style, PlaceholderStyle::Question);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_run_migrations_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("OUTBOX__DATABASE__URL", "postgres://outbox@localhost/app");
        env::set_var("OUTBOX__DATABASE__RUN_MIGRATIONS", "true");
        let result = OutboxConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.database.as_ref().unwrap().run_migrations);
    }

    #[test]
    fn test_allowed_tables_from_list() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("OUTBOX__PUBLISHER__ALLOWED_TABLES", "outbox_message,audit_events");
        let result = OutboxConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.publisher.allowed_tables,
            vec!["outbox_message".to_string(), "audit_events".to_string()]
        );
    }

    #[test]
    fn test_negative_retries_fail_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("OUTBOX__PUBLISHER__MAX_RETRIES", "-2");
        let result = OutboxConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_err());
        assert!(config.publisher_options().is_err());
    }

    #[test]
    fn test_invalid_database_url_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("OUTBOX__DATABASE__URL", "mysql://localhost/test");
        let result = OutboxConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[publisher]
table_name = "outbox_events"
batch_size = 10
max_retries = 5
backoff_ms = 250

[logging]
level = "debug"
"#
        )
        .unwrap();

        env::set_var("OUTBOX__PUBLISHER__BATCH_SIZE", "7");
        let result = OutboxConfig::load_from_file(file.path());
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.publisher.table_name, "outbox_events");
        assert_eq!(config.publisher.batch_size, 7);
        assert_eq!(config.publisher.max_retries, 5);
        assert_eq!(config.logging.level, "debug");

        let publisher = PublisherConfig::try_from(config.publisher_options().unwrap()).unwrap();
        assert_eq!(publisher.backoff_unit(), std::time::Duration::from_millis(250));
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let result = OutboxConfig::load_from_file(dir.path().join("absent.toml"));

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
