//! Database migration command.

use crate::output;
use docsync_core::config::AppConfig;
use docsync_core::error::AppError;
use docsync_database::DatabasePool;
use docsync_database::migration::run_migrations;

/// Apply all pending migrations to the configured database
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;

    println!("Running database migrations...");
    run_migrations(db.pool()).await?;
    output::print_success("All migrations applied successfully.");

    db.close().await;
    Ok(())
}
