//! Database connection management

use sqlx::{Pool, Postgres};
use std::time::Duration;
use crate::config::DatabaseConfig;
use crate::utils::errors::SignupError;

pub type DatabasePool = Pool<Postgres>;

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, SignupError> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect_with(config.connect_options())
        .await?;

    health_check(&pool).await?;

    tracing::info!(
        host = %config.host,
        database = %config.name,
        "Database connection pool created successfully"
    );
    Ok(pool)
}

/// Apply the idempotent schema scripts
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), SignupError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &DatabasePool) -> Result<(), SignupError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await?;

    Ok(())
}
