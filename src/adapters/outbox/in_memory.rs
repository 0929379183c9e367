//! In-memory statement executor for testing.
//!
//! Records every statement it is asked to run and models the outbox table's
//! unique `event_id` constraint. Failures can be scripted per call or per
//! event id.
//!
//! # Security Note
//!
//! This adapter is for **testing only**. It uses `.expect()` on lock
//! operations which will panic if locks are poisoned.

use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::EventId;
use crate::ports::{ExecContext, ExecutorError, StatementArg, StatementExecutor};

use super::statement::event_id_of;

/// A statement the executor accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub statement: String,
    pub args: Vec<StatementArg>,
}

/// In-memory [`StatementExecutor`].
///
/// # Example
///
/// ```ignore
/// let executor = Arc::new(InMemoryStatementExecutor::new());
/// let publisher = OutboxPublisher::new(executor.clone())?;
///
/// publisher.publish(&ExecContext::background(), &messages).await?;
///
/// assert_eq!(executor.row_count(), messages.len());
/// ```
#[derive(Default)]
pub struct InMemoryStatementExecutor {
    rows: RwLock<Vec<ExecutedStatement>>,
    attempts: RwLock<Vec<EventId>>,
    fail_next: Mutex<usize>,
    failing_events: RwLock<HashSet<String>>,
}

impl InMemoryStatementExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next `count` calls with a database error.
    pub fn fail_next(&self, count: usize) {
        *self
            .fail_next
            .lock()
            .expect("InMemoryStatementExecutor: fail_next lock poisoned") = count;
    }

    /// Fails every insert of `event_id` until [`clear`](Self::clear).
    pub fn fail_event(&self, event_id: impl Into<String>) {
        self.failing_events
            .write()
            .expect("InMemoryStatementExecutor: failing_events lock poisoned")
            .insert(event_id.into());
    }

    // === Test Helpers ===

    /// Statements that succeeded, in execution order.
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.rows
            .read()
            .expect("InMemoryStatementExecutor: rows lock poisoned")
            .clone()
    }

    pub fn row_count(&self) -> usize {
        self.rows
            .read()
            .expect("InMemoryStatementExecutor: rows lock poisoned")
            .len()
    }

    /// Event ids of stored rows, in insertion order.
    pub fn stored_event_ids(&self) -> Vec<EventId> {
        self.executed()
            .iter()
            .filter_map(|row| event_id_of(&row.args))
            .collect()
    }

    /// Event ids of every call, failed ones included.
    pub fn attempted_event_ids(&self) -> Vec<EventId> {
        self.attempts
            .read()
            .expect("InMemoryStatementExecutor: attempts lock poisoned")
            .clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts
            .read()
            .expect("InMemoryStatementExecutor: attempts lock poisoned")
            .len()
    }

    /// Drops stored rows, recorded attempts and scripted failures.
    pub fn clear(&self) {
        self.rows
            .write()
            .expect("InMemoryStatementExecutor: rows lock poisoned")
            .clear();
        self.attempts
            .write()
            .expect("InMemoryStatementExecutor: attempts lock poisoned")
            .clear();
        self.failing_events
            .write()
            .expect("InMemoryStatementExecutor: failing_events lock poisoned")
            .clear();
        self.fail_next(0);
    }

    fn take_scripted_failure(&self) -> bool {
        let mut remaining = self
            .fail_next
            .lock()
            .expect("InMemoryStatementExecutor: fail_next lock poisoned");
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl StatementExecutor for InMemoryStatementExecutor {
    async fn execute_statement(
        &self,
        ctx: &ExecContext,
        statement: &str,
        args: &[StatementArg],
    ) -> Result<u64, ExecutorError> {
        if let Some(reason) = ctx.err() {
            return Err(ExecutorError::Interrupted(reason));
        }

        let event_id = event_id_of(args).ok_or_else(|| ExecutorError::InvalidArgument {
            position: 1,
            reason: "expected event id text".to_string(),
        })?;
        self.attempts
            .write()
            .expect("InMemoryStatementExecutor: attempts lock poisoned")
            .push(event_id.clone());

        if self.take_scripted_failure() {
            return Err(ExecutorError::database("scripted failure"));
        }
        if self
            .failing_events
            .read()
            .expect("InMemoryStatementExecutor: failing_events lock poisoned")
            .contains(event_id.as_str())
        {
            return Err(ExecutorError::database(format!("scripted failure for {}", event_id)));
        }

        let mut rows = self
            .rows
            .write()
            .expect("InMemoryStatementExecutor: rows lock poisoned");
        if rows
            .iter()
            .any(|row| event_id_of(&row.args).as_ref() == Some(&event_id))
        {
            return Err(ExecutorError::database(format!(
                "duplicate key value violates unique constraint on event_id {}",
                event_id
            )));
        }
        rows.push(ExecutedStatement {
            statement: statement.to_string(),
            args: args.to_vec(),
        });

        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(id: &str) -> Vec<StatementArg> {
        vec![StatementArg::Text(id.to_string())]
    }

    #[tokio::test]
    async fn stores_rows_in_order() {
        let executor = InMemoryStatementExecutor::new();
        let ctx = ExecContext::background();

        executor.execute_statement(&ctx, "INSERT", &args("a")).await.unwrap();
        executor.execute_statement(&ctx, "INSERT", &args("b")).await.unwrap();

        let ids: Vec<String> = executor
            .stored_event_ids()
            .iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(executor.executed()[0].statement, "INSERT");
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed() {
        let executor = InMemoryStatementExecutor::new();
        let ctx = ExecContext::background();
        executor.fail_next(2);

        assert!(executor.execute_statement(&ctx, "INSERT", &args("a")).await.is_err());
        assert!(executor.execute_statement(&ctx, "INSERT", &args("a")).await.is_err());
        assert!(executor.execute_statement(&ctx, "INSERT", &args("a")).await.is_ok());

        assert_eq!(executor.attempt_count(), 3);
        assert_eq!(executor.row_count(), 1);
    }

    #[tokio::test]
    async fn failing_event_always_fails() {
        let executor = InMemoryStatementExecutor::new();
        let ctx = ExecContext::background();
        executor.fail_event("poison");

        for _ in 0..3 {
            assert!(executor.execute_statement(&ctx, "INSERT", &args("poison")).await.is_err());
        }
        assert!(executor.execute_statement(&ctx, "INSERT", &args("fine")).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_event_id_is_rejected() {
        let executor = InMemoryStatementExecutor::new();
        let ctx = ExecContext::background();

        executor.execute_statement(&ctx, "INSERT", &args("a")).await.unwrap();
        let err = executor
            .execute_statement(&ctx, "INSERT", &args("a"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("unique constraint"));
        assert_eq!(executor.row_count(), 1);
    }

    #[tokio::test]
    async fn done_context_is_refused() {
        let executor = InMemoryStatementExecutor::new();
        let (_tx, rx) = tokio::sync::watch::channel(true);
        let ctx = ExecContext::background().with_shutdown(rx);

        let err = executor
            .execute_statement(&ctx, "INSERT", &args("a"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::Interrupted(_)));
        assert_eq!(executor.attempt_count(), 0);
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let executor = InMemoryStatementExecutor::new();
        let ctx = ExecContext::background();
        executor.fail_event("b");
        executor.execute_statement(&ctx, "INSERT", &args("a")).await.unwrap();

        executor.clear();

        assert_eq!(executor.row_count(), 0);
        assert_eq!(executor.attempt_count(), 0);
        assert!(executor.execute_statement(&ctx, "INSERT", &args("b")).await.is_ok());
    }
}
