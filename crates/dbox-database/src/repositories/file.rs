//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use dbox_core::error::AppError;
use dbox_core::result::AppResult;
use dbox_core::types::FileId;
use dbox_entity::file::{File, FileRow, NewFile};

use super::{read_error, write_error};
use crate::store::FileStore;

/// Repository for the `files` table.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn create(&self, data: &NewFile) -> AppResult<File> {
        let row = sqlx::query_as::<_, FileRow>(
            "INSERT INTO files (folder_id, name, content_type, size_bytes, storage_key, locator) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.content_type)
        .bind(data.size_bytes)
        .bind(&data.storage_key)
        .bind(&data.locator)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("Failed to create file", e))?;

        File::try_from(row)
    }

    async fn update(&self, file: &File) -> AppResult<File> {
        let row = sqlx::query_as::<_, FileRow>(
            "UPDATE files SET folder_id = $2, name = $3, content_type = $4, size_bytes = $5, \
             storage_key = $6, locator = $7, is_deleted = $8, deleted_at = $9, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(file.id)
        .bind(file.folder_id)
        .bind(&file.name)
        .bind(&file.content_type)
        .bind(file.size_bytes)
        .bind(&file.storage_key)
        .bind(&file.locator)
        .bind(file.state.is_trashed())
        .bind(file.state.deleted_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("Failed to update file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {} not found", file.id)))?;

        File::try_from(row)
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, FileRow>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("Failed to find file", e))?
            .map(File::try_from)
            .transpose()
    }

    async fn find_by_storage_key(&self, storage_key: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, FileRow>("SELECT * FROM files WHERE storage_key = $1")
            .bind(storage_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("Failed to find file by storage key", e))?
            .map(File::try_from)
            .transpose()
    }

    async fn delete_by_id(&self, id: FileId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }
}
