//! OutboxPublisher - batched, retrying writer for outbox messages.
//!
//! Messages are written through a [`StatementExecutor`], so the publisher
//! works against a pool, a caller-owned transaction or a test double alike.
//!
//! ## Publish Algorithm
//!
//! 1. Empty input returns immediately without touching the executor
//! 2. Every message is validated up front; one invalid message aborts the call
//! 3. Messages are split into contiguous batches of `batch_size`
//! 4. Each message is inserted in order, with linear backoff between attempts
//! 5. The first message that exhausts its retries aborts the call
//!
//! Rows inserted before a failure are not rolled back by the publisher.
//! Run it on a [`PgTransactionExecutor`](crate::adapters::postgres::PgTransactionExecutor)
//! for all-or-nothing semantics.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::domain::outbox::Message;
use crate::ports::{
    ContextError, ExecContext, ExecutorError, MessagePublisher, PublishError, StatementExecutor,
};

use super::config::{PublisherConfig, PublisherConfigError, PublisherOptions};
use super::retry::{whole_millis, RetryPolicy};
use super::statement::InsertStatement;

/// Writes outbox messages through an injected [`StatementExecutor`].
///
/// Holds no mutable state; concurrent `publish` calls are as safe as the
/// executor they share.
pub struct OutboxPublisher {
    executor: Arc<dyn StatementExecutor>,
    config: PublisherConfig,
    statement: InsertStatement,
    retry: RetryPolicy,
}

impl OutboxPublisher {
    /// Create a publisher with default options.
    pub fn new(executor: Arc<dyn StatementExecutor>) -> Result<Self, PublisherConfigError> {
        Self::with_options(executor, PublisherOptions::default())
    }

    /// Create a publisher, validating `options` first.
    pub fn with_options(
        executor: Arc<dyn StatementExecutor>,
        options: PublisherOptions,
    ) -> Result<Self, PublisherConfigError> {
        let config = PublisherConfig::try_from(options)?;
        Ok(Self::with_config(executor, config))
    }

    /// Create a publisher from an already validated configuration.
    pub fn with_config(executor: Arc<dyn StatementExecutor>, config: PublisherConfig) -> Self {
        let statement = InsertStatement::new(config.table(), config.placeholder_style());
        let retry = RetryPolicy::new(config.max_retries(), config.backoff_unit());

        debug!(
            table = %config.table(),
            batch_size = config.batch_size(),
            max_retries = config.max_retries(),
            "Outbox publisher configured"
        );

        Self {
            executor,
            config,
            statement,
            retry,
        }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// The rendered insert statement.
    pub fn statement(&self) -> &str {
        self.statement.sql()
    }

    async fn insert_with_retry(
        &self,
        ctx: &ExecContext,
        message: &Message,
    ) -> Result<(), PublishError> {
        let args = self.statement.args_for(message);
        let max_attempts = self.retry.max_attempts();
        let interrupted = |reason: ContextError| PublishError::Interrupted {
            message_id: message.event_id().clone(),
            reason,
        };

        let mut attempt: u32 = 1;
        loop {
            if let Some(reason) = ctx.err() {
                return Err(interrupted(reason));
            }

            let err = match self
                .executor
                .execute_statement(ctx, self.statement.sql(), &args)
                .await
            {
                Ok(_) => return Ok(()),
                Err(ExecutorError::Interrupted(reason)) => return Err(interrupted(reason)),
                Err(e) => e,
            };

            if attempt >= max_attempts {
                error!(
                    message_id = %message.event_id(),
                    attempts = attempt,
                    error = %err,
                    "Outbox insert failed, retries exhausted"
                );
                return Err(PublishError::RetriesExhausted {
                    message_id: message.event_id().clone(),
                    retries: self.retry.max_retries(),
                    attempts: attempt,
                    source: err,
                });
            }

            let backoff = self.retry.backoff_after(attempt);
            warn!(
                message_id = %message.event_id(),
                attempt,
                max_attempts,
                backoff_ms = whole_millis(backoff),
                error = %err,
                "Outbox insert failed, retrying"
            );

            self.retry.wait(ctx, backoff).await.map_err(interrupted)?;
            attempt += 1;
        }
    }
}

#[async_trait]
impl MessagePublisher for OutboxPublisher {
    async fn publish(&self, ctx: &ExecContext, messages: &[Message]) -> Result<(), PublishError> {
        if messages.is_empty() {
            return Ok(());
        }

        for (index, message) in messages.iter().enumerate() {
            if let Err(source) = message.validate() {
                warn!(index, error = %source, "Rejected invalid outbox message");
                return Err(PublishError::InvalidMessage { index, source });
            }
        }

        let batch_size = self.config.batch_size();
        let batches = messages.len().div_ceil(batch_size);

        for (batch, chunk) in messages.chunks(batch_size).enumerate() {
            debug!(batch, batches, size = chunk.len(), "Publishing outbox batch");
            for message in chunk {
                self.insert_with_retry(ctx, message).await?;
            }
        }

        info!(
            messages = messages.len(),
            batches,
            table = %self.config.table(),
            "Published outbox messages"
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), PublishError> {
        Ok(())
    }
}
