//! Publisher settings as read from configuration sources.
//!
//! Numeric fields are signed so that negative values from the environment
//! surface as descriptive errors rather than parse failures.

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::outbox::{
    whole_millis, PlaceholderStyle, PublisherConfig, PublisherConfigError, PublisherOptions,
    DEFAULT_BACKOFF_UNIT, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_TABLE_NAME,
};

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct PublisherSettings {
    /// Destination table, optionally schema-qualified
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Messages per batch (must be positive)
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,

    /// Additional attempts after the first (must not be negative)
    #[serde(default = "default_max_retries")]
    pub max_retries: i64,

    /// Backoff unit in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// `dollar` ($1..$10) or `question` (?)
    #[serde(default)]
    pub placeholder_style: PlaceholderStyle,

    /// When non-empty, the only table names accepted
    #[serde(default)]
    pub allowed_tables: Vec<String>,
}

impl PublisherSettings {
    /// Converts to programmatic options, rejecting out-of-range numbers.
    pub fn to_options(&self) -> Result<PublisherOptions, PublisherConfigError> {
        if self.batch_size <= 0 {
            return Err(PublisherConfigError::NonPositiveBatchSize(self.batch_size));
        }
        if self.max_retries < 0 {
            return Err(PublisherConfigError::NegativeMaxRetries(self.max_retries));
        }

        let mut options = PublisherOptions::new()
            .table_name(self.table_name.clone())
            .batch_size(usize::try_from(self.batch_size).unwrap_or(usize::MAX))
            .max_retries(u32::try_from(self.max_retries).unwrap_or(u32::MAX))
            .backoff_unit(Duration::from_millis(self.backoff_ms))
            .placeholder_style(self.placeholder_style);
        if !self.allowed_tables.is_empty() {
            options = options.allowed_tables(self.allowed_tables.iter().cloned());
        }

        Ok(options)
    }

    /// Validate publisher settings, including the table name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        PublisherConfig::try_from(self.to_options()?)?;
        Ok(())
    }
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            placeholder_style: PlaceholderStyle::default(),
            allowed_tables: Vec::new(),
        }
    }
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_batch_size() -> i64 {
    DEFAULT_BATCH_SIZE as i64
}

fn default_max_retries() -> i64 {
    i64::from(DEFAULT_MAX_RETRIES)
}

fn default_backoff_ms() -> u64 {
    whole_millis(DEFAULT_BACKOFF_UNIT)
}
