//! Long-running worker command.

use std::sync::Arc;

use dbox_core::error::AppError;
use dbox_worker::{CronScheduler, OrphanSweepJob};

use crate::bootstrap::AppContext;
use crate::output;

/// Run scheduled tasks until Ctrl-C
pub async fn execute(ctx: &AppContext) -> Result<(), AppError> {
    if !ctx.config.worker.enabled {
        output::print_warning("Worker is disabled in configuration (worker.enabled = false).");
        return Ok(());
    }

    let mut scheduler = CronScheduler::new().await?;
    let job = Arc::new(OrphanSweepJob::new(Arc::clone(&ctx.coordinator)));
    scheduler
        .register_orphan_sweep(&ctx.config.worker.orphan_sweep_cron, job)
        .await?;
    scheduler.start().await?;

    tracing::info!("DBox worker v{} running", env!("CARGO_PKG_VERSION"));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for shutdown signal: {}", e)))?;

    tracing::info!("Shutdown signal received");
    scheduler.shutdown().await?;
    ctx.db.close().await;
    Ok(())
}
