//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use dbox_core::error::AppError;

use crate::jobs::OrphanSweepJob;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Orphan sweep, on the given six-field cron expression
    pub async fn register_orphan_sweep(
        &self,
        schedule: &str,
        job: Arc<OrphanSweepJob>,
    ) -> Result<(), AppError> {
        let cron_job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                match job.run().await {
                    Ok(Some(report)) => {
                        tracing::debug!(
                            examined = report.examined,
                            reclaimed = report.reclaimed,
                            "Orphan sweep tick done"
                        );
                    }
                    Ok(None) => {}
                    Err(e) => tracing::error!("Orphan sweep failed: {}", e),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid orphan sweep schedule '{}': {}",
                schedule, e
            ))
        })?;

        self.scheduler.add(cron_job).await.map_err(|e| {
            AppError::internal(format!("Failed to add orphan_sweep schedule: {}", e))
        })?;

        tracing::info!("Registered: orphan_sweep ({})", schedule);
        Ok(())
    }
}
