//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the outbox core to storage:
//! - `outbox` - The batching, retrying publisher plus an in-memory executor
//! - `postgres` - PostgreSQL statement executors (pooled and transactional)

pub mod outbox;
pub mod postgres;

pub use outbox::{
    InMemoryStatementExecutor, OutboxPublisher, PlaceholderStyle, PublisherConfig,
    PublisherConfigError, PublisherOptions,
};
pub use postgres::{PgStatementExecutor, PgTransactionExecutor};
