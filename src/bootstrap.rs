//! Wires configuration into a ready coordinator.

use std::sync::Arc;

use dbox_core::config::AppConfig;
use dbox_core::error::AppError;
use dbox_database::DatabasePool;
use dbox_service::FileCoordinator;

/// Everything a command needs at runtime.
pub struct AppContext {
    pub config: AppConfig,
    pub db: DatabasePool,
    pub coordinator: Arc<FileCoordinator>,
}

impl AppContext {
    /// Connect to the metadata database and the object store. Both are
    /// checked here so a bad store fails before any command runs.
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        let db = DatabasePool::connect(&config.database).await?;
        db.verify_schema().await?;
        let repos = db.repositories();
        let objects = dbox_storage::build_object_store(&config.storage).await?;

        let coordinator = Arc::new(FileCoordinator::new(
            repos.files,
            repos.folders,
            repos.orphans,
            objects,
            config.coordinator.clone(),
            config.storage.max_upload_size_bytes,
        ));

        tracing::debug!(
            provider = ?config.storage.provider,
            bucket = %config.storage.bucket,
            "Coordinator ready"
        );

        Ok(Self {
            config,
            db,
            coordinator,
        })
    }
}
