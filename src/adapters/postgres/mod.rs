//! PostgreSQL adapters - database implementations of the executor port.
//!
//! - `PgStatementExecutor` - pool-backed, one autocommit statement per call
//! - `PgTransactionExecutor` - statements join a caller-owned transaction
//! - `connect` / `pool_options` / `run_migrations` - pool construction and schema setup

mod executor;
mod pool;

pub use executor::{PgStatementExecutor, PgTransactionExecutor};
pub use pool::{connect, pool_options, run_migrations};
