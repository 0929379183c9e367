//! Tracing subscriber setup.
//!
//! Libraries only emit `tracing` events; binaries and test harnesses call
//! [`init_tracing`] once to decide where they go.

use thiserror::Error;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `config.level`. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.format {
        LogFormat::Json => builder.json().finish().try_init(),
        LogFormat::Compact => builder.compact().finish().try_init(),
    };

    result.map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_is_an_error() {
        let config = LoggingConfig::default();

        let _ = init_tracing(&config);

        assert!(init_tracing(&config).is_err());
    }
}
