//! Builds the configured object store.

use std::sync::Arc;

use tracing::info;

use dbox_core::config::{StorageConfig, StorageProviderKind};
use dbox_core::error::AppError;
use dbox_core::result::AppResult;
use dbox_core::traits::ObjectStore;

use crate::providers::memory::MemoryObjectStore;

/// Construct the object store selected by `config.provider`.
pub async fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    info!(provider = ?config.provider, bucket = %config.bucket, "Initializing object store");

    let store: Arc<dyn ObjectStore> = match config.provider {
        StorageProviderKind::Memory => Arc::new(MemoryObjectStore::new(&config.bucket)),
        StorageProviderKind::Local => build_local(config).await?,
        StorageProviderKind::S3 => build_s3(config).await?,
    };

    if !store.health_check().await? {
        return Err(AppError::configuration(format!(
            "Object store '{}' (bucket {}) failed its health check",
            store.provider_type(),
            store.bucket()
        )));
    }

    Ok(store)
}

#[cfg(feature = "local")]
async fn build_local(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    let store = crate::providers::local::LocalObjectStore::new(
        &config.local.root_path,
        &config.bucket,
        &config.local.base_url,
    )
    .await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "local"))]
async fn build_local(_config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    Err(AppError::configuration(
        "dbox-storage was built without the `local` feature",
    ))
}

#[cfg(feature = "s3")]
async fn build_s3(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    let store = crate::providers::s3::S3ObjectStore::new(&config.bucket, &config.s3).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "s3"))]
async fn build_s3(_config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    Err(AppError::configuration(
        "dbox-storage was built without the `s3` feature",
    ))
}
