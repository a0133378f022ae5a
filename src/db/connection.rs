use std::time::Duration;

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Builds the process-wide pool. It is created once in `main` and handed to
/// the repositories through `AppState`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    tracing::info!(
        "Database pool ready (max_connections: {})",
        config.max_connections
    );
    Ok(pool)
}
