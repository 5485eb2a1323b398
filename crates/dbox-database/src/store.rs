//! Metadata store traits consumed by the file lifecycle coordinator.
//!
//! Each trait is the narrow slice of the relational store one concern needs.
//! The PostgreSQL repositories in [`crate::repositories`] implement them;
//! tests substitute in-memory versions.

use async_trait::async_trait;

use dbox_core::result::AppResult;
use dbox_core::types::{FileId, FolderId, OrphanId};
use dbox_entity::{File, Folder, NewFile, OrphanBlob};

/// File record persistence.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new record; the store assigns the identifier and timestamps.
    async fn create(&self, data: &NewFile) -> AppResult<File>;

    /// Persist every mutable field of `file` and return the stored row.
    async fn update(&self, file: &File) -> AppResult<File>;

    /// Find a file by identifier.
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>>;

    /// Find the file whose blob lives under `storage_key`.
    async fn find_by_storage_key(&self, storage_key: &str) -> AppResult<Option<File>>;

    /// Delete a record. Returns `false` if nothing was deleted.
    async fn delete_by_id(&self, id: FileId) -> AppResult<bool>;
}

/// Folder lookups.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by identifier.
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>>;
}

/// Ledger of storage keys that may hold unreferenced blobs.
#[async_trait]
pub trait OrphanStore: Send + Sync + std::fmt::Debug + 'static {
    /// Record a key for later cleanup.
    async fn record(&self, storage_key: &str, reason: &str) -> AppResult<OrphanBlob>;

    /// Oldest entries first, at most `limit`.
    async fn list_oldest(&self, limit: u32) -> AppResult<Vec<OrphanBlob>>;

    /// Remove an entry once its key is resolved.
    async fn remove(&self, id: OrphanId) -> AppResult<bool>;

    /// Count a failed cleanup attempt.
    async fn bump_attempts(&self, id: OrphanId) -> AppResult<()>;
}
