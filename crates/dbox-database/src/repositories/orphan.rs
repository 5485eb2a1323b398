//! Orphan ledger repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use dbox_core::result::AppResult;
use dbox_core::types::OrphanId;
use dbox_entity::orphan::OrphanBlob;

use super::{read_error, write_error};
use crate::store::OrphanStore;

/// Repository for the `orphan_blobs` table.
#[derive(Debug, Clone)]
pub struct OrphanRepository {
    pool: PgPool,
}

impl OrphanRepository {
    /// Create a new orphan repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrphanStore for OrphanRepository {
    async fn record(&self, storage_key: &str, reason: &str) -> AppResult<OrphanBlob> {
        sqlx::query_as::<_, OrphanBlob>(
            "INSERT INTO orphan_blobs (storage_key, reason) VALUES ($1, $2) RETURNING *",
        )
        .bind(storage_key)
        .bind(reason)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("Failed to record orphan blob", e))
    }

    async fn list_oldest(&self, limit: u32) -> AppResult<Vec<OrphanBlob>> {
        sqlx::query_as::<_, OrphanBlob>(
            "SELECT * FROM orphan_blobs ORDER BY recorded_at ASC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("Failed to list orphan blobs", e))
    }

    async fn remove(&self, id: OrphanId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM orphan_blobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("Failed to remove orphan entry", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn bump_attempts(&self, id: OrphanId) -> AppResult<()> {
        sqlx::query("UPDATE orphan_blobs SET attempts = attempts + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("Failed to bump orphan attempts", e))?;
        Ok(())
    }
}
