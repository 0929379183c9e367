//! Connection settings for the database that holds the outbox table.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const URL_SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];

/// Upper bound on `max_connections`.
pub const MAX_POOL_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL. Redacted from `Debug` output.
    pub url: SecretString,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long one insert attempt waits for a pooled connection. A timeout
    /// counts as a failed attempt and goes through the publisher's retries.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Close connections idle this long. Unset keeps them open.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,

    /// Create the outbox table when the pool is opened.
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.url.expose_secret();
        if url.is_empty() {
            return Err(ValidationError::MissingRequired("OUTBOX__DATABASE__URL"));
        }
        if !URL_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ValidationError::InvalidAcquireTimeout);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: SecretString::new(String::new()),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            idle_timeout_secs: None,
            run_migrations: false,
        }
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: SecretString::new(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn migrations_are_opt_in() {
        let config: DatabaseConfig =
            serde_json::from_value(json!({"url": "postgres://localhost/app"})).unwrap();

        assert!(!config.run_migrations);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(5));
        assert_eq!(config.idle_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn run_migrations_flag_is_read() {
        let config: DatabaseConfig = serde_json::from_value(json!({
            "url": "postgres://localhost/app",
            "run_migrations": true,
            "idle_timeout_secs": 60
        }))
        .unwrap();

        assert!(config.run_migrations);
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn both_postgres_schemes_are_accepted() {
        assert!(with_url("postgres://outbox@db/app").validate().is_ok());
        assert!(with_url("postgresql://outbox@db/app").validate().is_ok());
    }

    #[test]
    fn other_databases_are_rejected() {
        assert!(matches!(
            with_url("mysql://db/app").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn missing_url_names_the_variable() {
        let err = DatabaseConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("OUTBOX__DATABASE__URL"));
    }

    #[test]
    fn pool_bounds_are_checked() {
        let empty = DatabaseConfig {
            min_connections: 0,
            max_connections: 0,
            ..with_url("postgres://db/app")
        };
        let inverted = DatabaseConfig {
            min_connections: 4,
            max_connections: 2,
            ..with_url("postgres://db/app")
        };
        let oversized = DatabaseConfig {
            max_connections: MAX_POOL_SIZE + 1,
            ..with_url("postgres://db/app")
        };

        assert!(matches!(empty.validate(), Err(ValidationError::InvalidPoolSize)));
        assert!(matches!(inverted.validate(), Err(ValidationError::InvalidPoolSize)));
        assert!(matches!(oversized.validate(), Err(ValidationError::PoolSizeTooLarge)));
    }

    #[test]
    fn zero_acquire_timeout_is_rejected() {
        let config = DatabaseConfig {
            acquire_timeout_secs: 0,
            ..with_url("postgres://db/app")
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidAcquireTimeout)));
    }

    #[test]
    fn credentials_stay_out_of_debug_output() {
        let config = with_url("postgresql://outbox:hunter2@db/app");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
