//! Connection pool and schema setup.

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Pool sizing and timeouts taken from `config`.
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
}

/// Opens a pool and, when `config.run_migrations` is set, applies the
/// outbox migrations to it.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = pool_options(config)
        .connect(config.url.expose_secret())
        .await?;

    info!(
        min_connections = config.min_connections,
        max_connections = config.max_connections,
        run_migrations = config.run_migrations,
        "Connected to PostgreSQL"
    );

    if config.run_migrations {
        run_migrations(&pool).await?;
    }
    Ok(pool)
}

/// Applies the bundled outbox migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running outbox migrations");
    sqlx::migrate!("./migrations").run(pool).await
}
