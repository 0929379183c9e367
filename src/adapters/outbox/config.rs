//! Publisher configuration.
//!
//! `PublisherOptions` is the unchecked, programmatic input; `PublisherConfig`
//! is what a publisher actually runs with. The only way from one to the
//! other is `PublisherConfig::try_from`, so a publisher can never be built
//! around an unsanitized table name or a zero batch size.
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `table_name` | `outbox_message` | Destination table (sanitized) |
//! | `batch_size` | 100 | Messages per batch |
//! | `max_retries` | 3 | Additional attempts after the first |
//! | `backoff_unit` | 100ms | Sleep before attempt n+1 is n units |
//! | `placeholder_style` | `$n` | Positional parameter syntax |

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::outbox::{is_sql_injection_attempt, IdentifierError, SqlIdentifier};

pub const DEFAULT_TABLE_NAME: &str = "outbox_message";
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_millis(100);

/// Positional parameter syntax of the target database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ... (PostgreSQL)
    #[default]
    Dollar,
    /// `?` (MySQL, SQLite)
    Question,
}

impl PlaceholderStyle {
    /// Placeholder for the 1-based `position`.
    pub fn placeholder(self, position: usize) -> String {
        match self {
            Self::Dollar => format!("${}", position),
            Self::Question => "?".to_string(),
        }
    }
}

/// Errors raised while turning options into a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublisherConfigError {
    #[error("invalid table name: {0}")]
    InvalidTableName(#[from] IdentifierError),

    #[error("batch size must be positive, got {0}")]
    NonPositiveBatchSize(i64),

    #[error("max retries cannot be negative, got {0}")]
    NegativeMaxRetries(i64),
}

/// Unchecked publisher settings with builder-style setters.
#[derive(Debug, Clone)]
pub struct PublisherOptions {
    table_name: String,
    batch_size: usize,
    max_retries: u32,
    backoff_unit: Duration,
    placeholder_style: PlaceholderStyle,
    allowed_tables: Option<HashSet<String>>,
}

impl Default for PublisherOptions {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            placeholder_style: PlaceholderStyle::default(),
            allowed_tables: None,
        }
    }
}

impl PublisherOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Additional attempts after the first; total attempts are `max_retries + 1`.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn backoff_unit(mut self, backoff_unit: Duration) -> Self {
        self.backoff_unit = backoff_unit;
        self
    }

    pub fn placeholder_style(mut self, placeholder_style: PlaceholderStyle) -> Self {
        self.placeholder_style = placeholder_style;
        self
    }

    /// Restricts the table name to one of `tables` (case-insensitive).
    pub fn allowed_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }
}

/// Validated publisher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    table: SqlIdentifier,
    batch_size: usize,
    max_retries: u32,
    backoff_unit: Duration,
    placeholder_style: PlaceholderStyle,
}

impl PublisherConfig {
    pub fn table(&self) -> &SqlIdentifier {
        &self.table
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_unit(&self) -> Duration {
        self.backoff_unit
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholder_style
    }
}

impl TryFrom<PublisherOptions> for PublisherConfig {
    type Error = PublisherConfigError;

    fn try_from(options: PublisherOptions) -> Result<Self, Self::Error> {
        if options.batch_size == 0 {
            return Err(PublisherConfigError::NonPositiveBatchSize(0));
        }

        let parsed = match &options.allowed_tables {
            Some(allowed) => SqlIdentifier::parse_allowed(&options.table_name, allowed),
            None => SqlIdentifier::parse(&options.table_name),
        };
        let table = parsed.map_err(|e| {
            if is_sql_injection_attempt(&options.table_name) {
                warn!(error = %e, "Rejected outbox table name resembling an injection attempt");
            } else {
                warn!(table = %options.table_name, error = %e, "Rejected outbox table name");
            }
            e
        })?;

        Ok(Self {
            table,
            batch_size: options.batch_size,
            max_retries: options.max_retries,
            backoff_unit: options.backoff_unit,
            placeholder_style: options.placeholder_style,
        })
    }
}
