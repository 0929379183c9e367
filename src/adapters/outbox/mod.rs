//! Outbox publisher adapter.
//!
//! - `OutboxPublisher` - batching, retrying [`MessagePublisher`](crate::ports::MessagePublisher)
//! - `PublisherOptions` / `PublisherConfig` - unchecked and validated settings
//! - `InsertStatement` - the ten-column insert, rendered once
//! - `RetryPolicy` - linear backoff between attempts
//! - `InMemoryStatementExecutor` - recording executor for tests

mod config;
mod in_memory;
mod publisher;
mod retry;
mod statement;

pub use config::{
    PlaceholderStyle, PublisherConfig, PublisherConfigError, PublisherOptions,
    DEFAULT_BACKOFF_UNIT, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_TABLE_NAME,
};
pub use in_memory::{ExecutedStatement, InMemoryStatementExecutor};
pub use publisher::OutboxPublisher;
pub use retry::{whole_millis, RetryPolicy};
pub use statement::{event_id_of, InsertStatement, OUTBOX_COLUMNS};
