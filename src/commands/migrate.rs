//! Database migration command.

use dbox_core::config::AppConfig;
use dbox_core::error::AppError;
use dbox_database::DatabasePool;

use crate::output;

/// Apply all pending migrations
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;

    println!("Running database migrations...");
    dbox_database::migration::run_migrations(db.pool()).await?;
    output::print_success("All migrations applied successfully.");

    db.close().await;
    Ok(())
}
