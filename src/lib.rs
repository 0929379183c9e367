//! Event Outbox - transactional outbox publisher for domain events
//!
//! Domain events are built as [`Message`](domain::outbox::Message)s, validated,
//! and written to an outbox table through an injected
//! [`StatementExecutor`](ports::StatementExecutor). A separate relay (not part
//! of this crate) forwards stored rows to a broker.
//!
//! ```no_run
//! use std::sync::Arc;
//! use event_outbox::adapters::{OutboxPublisher, PgStatementExecutor, PublisherOptions};
//! use event_outbox::domain::outbox::MessageBuilder;
//! use event_outbox::ports::{ExecContext, MessagePublisher};
//!
//! # async fn run(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let publisher = OutboxPublisher::with_options(
//!     Arc::new(PgStatementExecutor::new(pool)),
//!     PublisherOptions::new().batch_size(50).max_retries(2),
//! )?;
//!
//! let message = MessageBuilder::new()
//!     .event_topic("orders.events")
//!     .event_domain("orders")
//!     .event_type("created")
//!     .object_type("order")
//!     .build()?;
//!
//! publisher.publish(&ExecContext::background(), &[message]).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
