//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dbox_core::error::AppError;
use dbox_core::types::{FileId, FolderId};

use super::state::TrashState;

/// Metadata for one stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// Containing folder; `None` means the root.
    pub folder_id: Option<FolderId>,
    /// Display name, including extension.
    pub name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes of the stored blob.
    pub size_bytes: i64,
    /// Object-store key the blob lives under.
    pub storage_key: String,
    /// Locator returned by the object store for `storage_key`.
    pub locator: String,
    /// Soft-delete state.
    pub state: TrashState,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last changed.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Whether the file is in the trash.
    pub fn is_trashed(&self) -> bool {
        self.state.is_trashed()
    }
}

/// Raw `files` table row.
#[derive(Debug, Clone, FromRow)]
pub struct FileRow {
    pub id: FileId,
    pub folder_id: Option<FolderId>,
    pub name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub locator: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FileRow> for File {
    type Error = AppError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        let state = TrashState::from_columns(row.is_deleted, row.deleted_at).ok_or_else(|| {
            AppError::internal(format!(
                "File {} has inconsistent trash columns (is_deleted={}, deleted_at={:?})",
                row.id, row.is_deleted, row.deleted_at
            ))
        })?;

        Ok(Self {
            id: row.id,
            folder_id: row.folder_id,
            name: row.name,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            storage_key: row.storage_key,
            locator: row.locator,
            state,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFile {
    /// Target folder (`None` for root).
    pub folder_id: Option<FolderId>,
    /// File name.
    pub name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Object-store key.
    pub storage_key: String,
    /// Object-store locator.
    pub locator: String,
}
