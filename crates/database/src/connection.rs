use crate::error::StoreError;
use dotenvy::dotenv;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::env;
use std::time::Duration;

// Pool sizing for the ledger workload: a request is a short burst of
// aggregate reads plus at most one notification insert, so a small pool
// with a tight acquire timeout keeps a misconfigured database from
// stalling every report.
const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Establishes the PostgreSQL connection pool backing `PgLedger`.
///
/// Reads `DATABASE_URL` from the environment, loading a `.env` file when one
/// is present; the variable may equally come from the real environment. The
/// returned pool is shared across the entire application.
pub async fn connect() -> Result<PgPool, StoreError> {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| StoreError::ConnectionConfig("DATABASE_URL must be set.".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&database_url)
        .await?;

    tracing::info!(max_connections = MAX_CONNECTIONS, "ledger database pool ready");
    Ok(pool)
}

/// Applies the schema migrations bundled with this crate (`./migrations`),
/// bringing a fresh or out-of-date database up to the current ledger schema.
/// The binary runs this on startup so deployments never serve against a
/// stale schema.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("ledger schema migrations applied");
    Ok(())
}
