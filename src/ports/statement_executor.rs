//! StatementExecutor port - the one storage capability the publisher needs.
//!
//! Implementations execute a single parameterized statement and report the
//! number of affected rows. Pooling and transaction discipline belong to the
//! implementation, not to callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::exec_context::{ContextError, ExecContext};

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementArg {
    Text(String),
    NullableText(Option<String>),
    /// Serialized JSON document, or SQL NULL.
    Json(Option<Vec<u8>>),
    Timestamp(DateTime<Utc>),
}

/// Errors raised by a [`StatementExecutor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("database error: {0}")]
    Database(String),

    #[error("invalid argument at position {position}: {reason}")]
    InvalidArgument { position: usize, reason: String },

    #[error("statement interrupted: {0}")]
    Interrupted(#[from] ContextError),
}

impl ExecutorError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}

/// Port for executing one parameterized statement against durable storage.
///
/// Arguments bind positionally, in order, to the statement's placeholders.
/// Implementations should honour `ctx` and abandon the statement once it is done.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute_statement(
        &self,
        ctx: &ExecContext,
        statement: &str,
        args: &[StatementArg],
    ) -> Result<u64, ExecutorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_wraps_context_error() {
        let err: ExecutorError = ContextError::DeadlineExceeded.into();

        assert_eq!(err, ExecutorError::Interrupted(ContextError::DeadlineExceeded));
        assert_eq!(err.to_string(), "statement interrupted: context deadline exceeded");
    }

    #[test]
    fn invalid_argument_names_position() {
        let err = ExecutorError::InvalidArgument {
            position: 7,
            reason: "payload is not valid JSON".to_string(),
        };

        assert!(err.to_string().contains("position 7"));
    }
}
