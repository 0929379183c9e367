//! PostgreSQL implementations of the StatementExecutor port.
//!
//! - `PgStatementExecutor` runs each statement on a pooled connection
//! - `PgTransactionExecutor` runs statements inside one caller-owned
//!   transaction, so outbox rows commit or roll back with business writes

use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use crate::ports::{ExecContext, ExecutorError, StatementArg, StatementExecutor};

/// Pool-backed executor. Each statement autocommits.
#[derive(Debug, Clone)]
pub struct PgStatementExecutor {
    pool: PgPool,
}

impl PgStatementExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatementExecutor for PgStatementExecutor {
    async fn execute_statement(
        &self,
        ctx: &ExecContext,
        statement: &str,
        args: &[StatementArg],
    ) -> Result<u64, ExecutorError> {
        let query = prepare(statement, args)?;
        let result = ctx
            .run(query.execute(&self.pool))
            .await?
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}

/// Executor bound to a single open transaction.
///
/// Share it behind an `Arc`: hand one clone to the publisher and keep one to
/// [`commit`](Self::commit) or [`rollback`](Self::rollback). Statements after
/// the transaction finished fail with a database error.
pub struct PgTransactionExecutor {
    tx: Mutex<Option<Transaction<'static, Postgres>>>,
}

impl PgTransactionExecutor {
    /// Begin a new transaction on `pool`.
    pub async fn begin(pool: &PgPool) -> Result<Self, ExecutorError> {
        let tx = pool.begin().await.map_err(|e| {
            ExecutorError::database(format!("Failed to begin transaction: {}", e))
        })?;
        Ok(Self::from_transaction(tx))
    }

    /// Adopt a transaction the caller already opened.
    pub fn from_transaction(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    /// Exclusive access to the open transaction for business writes.
    ///
    /// `None` once the transaction was committed or rolled back.
    pub async fn transaction(&self) -> MutexGuard<'_, Option<Transaction<'static, Postgres>>> {
        self.tx.lock().await
    }

    pub async fn commit(&self) -> Result<(), ExecutorError> {
        let tx = self.take().await?;
        tx.commit().await.map_err(|e| {
            ExecutorError::database(format!("Failed to commit transaction: {}", e))
        })
    }

    pub async fn rollback(&self) -> Result<(), ExecutorError> {
        let tx = self.take().await?;
        tx.rollback().await.map_err(|e| {
            ExecutorError::database(format!("Failed to roll back transaction: {}", e))
        })
    }

    async fn take(&self) -> Result<Transaction<'static, Postgres>, ExecutorError> {
        self.tx
            .lock()
            .await
            .take()
            .ok_or_else(|| ExecutorError::database("transaction already finished"))
    }
}

#[async_trait]
impl StatementExecutor for PgTransactionExecutor {
    async fn execute_statement(
        &self,
        ctx: &ExecContext,
        statement: &str,
        args: &[StatementArg],
    ) -> Result<u64, ExecutorError> {
        let query = prepare(statement, args)?;
        let mut guard = ctx.run(self.tx.lock()).await?;
        let tx = guard
            .as_mut()
            .ok_or_else(|| ExecutorError::database("transaction already finished"))?;

        let result = ctx
            .run(query.execute(&mut **tx))
            .await?
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}

fn prepare<'q>(
    statement: &'q str,
    args: &[StatementArg],
) -> Result<Query<'q, Postgres, PgArguments>, ExecutorError> {
    let mut query = sqlx::query(statement);
    for (index, arg) in args.iter().enumerate() {
        query = match arg {
            StatementArg::Text(value) => query.bind(value.clone()),
            StatementArg::NullableText(value) => query.bind(value.clone()),
            StatementArg::Json(bytes) => query.bind(json_document(index + 1, bytes.as_deref())?),
            StatementArg::Timestamp(value) => query.bind(*value),
        };
    }
    Ok(query)
}

/// Parses serialized JSON so it binds as `jsonb`.
fn json_document(
    position: usize,
    bytes: Option<&[u8]>,
) -> Result<Option<Json<serde_json::Value>>, ExecutorError> {
    bytes
        .map(|bytes| {
            serde_json::from_slice(bytes)
                .map(Json)
                .map_err(|e| ExecutorError::InvalidArgument {
                    position,
                    reason: format!("not a valid JSON document: {}", e),
                })
        })
        .transpose()
}

fn database_error(e: sqlx::Error) -> ExecutorError {
    if let sqlx::Error::Database(db_err) = &e {
        if let Some(constraint) = db_err.constraint() {
            return ExecutorError::database(format!(
                "constraint {} violated: {}",
                constraint,
                db_err.message()
            ));
        }
    }
    ExecutorError::database(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_arguments_are_parsed() {
        let parsed = json_document(8, Some(br#"{"id": 7}"#)).unwrap();
        assert_eq!(parsed.map(|j| j.0), Some(json!({"id": 7})));
    }

    #[test]
    fn absent_json_binds_null() {
        assert!(json_document(9, None).unwrap().is_none());
    }

    #[test]
    fn malformed_json_names_its_position() {
        let err = json_document(8, Some(b"not json")).unwrap_err();

        match err {
            ExecutorError::InvalidArgument { position, reason } => {
                assert_eq!(position, 8);
                assert!(reason.contains("JSON"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn prepare_rejects_bad_json_before_execution() {
        let args = vec![
            StatementArg::Text("evt-1".to_string()),
            StatementArg::Json(Some(b"{".to_vec())),
        ];

        match prepare("INSERT INTO t (a, b) VALUES ($1, $2)", &args) {
            Err(ExecutorError::InvalidArgument { position, .. }) => assert_eq!(position, 2),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("malformed JSON was bound"),
        }
    }

    #[test]
    fn pool_errors_become_database_errors() {
        let err = database_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ExecutorError::Database(_)));
    }
}
