//! MessagePublisher port - durable hand-off of outbox messages.
//!
//! A successful `publish` means every message has a row in the outbox table,
//! in input order. On error nothing after the failing message was attempted;
//! rows written before it stay written.

use async_trait::async_trait;
use thiserror::Error;

use super::exec_context::{ContextError, ExecContext};
use super::statement_executor::ExecutorError;
use crate::domain::foundation::EventId;
use crate::domain::outbox::{Message, MessageValidationError};

/// Errors from [`MessagePublisher::publish`].
#[derive(Debug, Error)]
pub enum PublishError {
    /// A message failed validation. Nothing from the call was written.
    #[error("invalid message at index {index}: {source}")]
    InvalidMessage {
        index: usize,
        source: MessageValidationError,
    },

    /// Every attempt to write the message failed.
    #[error("failed to publish message {message_id} after {attempts} attempts ({retries} retries): {source}")]
    RetriesExhausted {
        message_id: EventId,
        retries: u32,
        attempts: u32,
        source: ExecutorError,
    },

    /// The call's context stopped before the message was written.
    #[error("publishing message {message_id} interrupted: {reason}")]
    Interrupted {
        message_id: EventId,
        reason: ContextError,
    },
}

impl PublishError {
    /// Identifier of the message that stopped the call, if one was reached.
    pub fn message_id(&self) -> Option<&EventId> {
        match self {
            Self::InvalidMessage { .. } => None,
            Self::RetriesExhausted { message_id, .. } | Self::Interrupted { message_id, .. } => {
                Some(message_id)
            }
        }
    }
}

/// Port for writing outbox messages.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Writes `messages` in order. An empty slice is a no-op.
    async fn publish(&self, ctx: &ExecContext, messages: &[Message]) -> Result<(), PublishError>;

    /// Releases resources. Always succeeds for statement-per-call publishers.
    async fn close(&self) -> Result<(), PublishError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_retries_names_message_and_retry_count() {
        let err = PublishError::RetriesExhausted {
            message_id: EventId::from_string("evt-42"),
            retries: 3,
            attempts: 4,
            source: ExecutorError::database("connection reset"),
        };

        let text = err.to_string();
        assert!(text.contains("evt-42"));
        assert!(text.contains("3 retries"));
        assert!(text.contains("4 attempts"));
        assert!(text.contains("connection reset"));
        assert_eq!(err.message_id().map(EventId::as_str), Some("evt-42"));
    }

    #[test]
    fn exhausted_retries_exposes_source() {
        use std::error::Error as _;

        let err = PublishError::RetriesExhausted {
            message_id: EventId::from_string("evt-1"),
            retries: 0,
            attempts: 1,
            source: ExecutorError::database("boom"),
        };

        assert!(err.source().is_some());
    }
}
