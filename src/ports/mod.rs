//! Ports - Interfaces between the outbox core and storage.
//!
//! - `StatementExecutor` - execute one parameterized statement (the storage seam)
//! - `ExecContext` - cancellation and deadline scope threaded through every call
//! - `MessagePublisher` - durable, ordered hand-off of outbox messages

mod exec_context;
mod message_publisher;
mod statement_executor;

pub use exec_context::{ContextError, ExecContext};
pub use message_publisher::{MessagePublisher, PublishError};
pub use statement_executor::{ExecutorError, StatementArg, StatementExecutor};

#[cfg(test)]
pub use statement_executor::MockStatementExecutor;
