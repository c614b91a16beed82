//! Schema migration runner for the coupon and claim tables.

use sqlx::PgPool;
use tracing::info;

use couponhub_core::error::{AppError, ErrorKind};

/// Apply any migrations not yet recorded in the target database.
///
/// Runs at startup, before the store serves its first claim.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Applying schema migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
        })?;

    info!("Schema is up to date");
    Ok(())
}
