//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use dbox_core::result::AppResult;
use dbox_core::types::FolderId;
use dbox_entity::folder::Folder;

use super::read_error;
use crate::store::FolderStore;

/// Read-only repository for the `folders` table.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("Failed to find folder", e))
    }
}
