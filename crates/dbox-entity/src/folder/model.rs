//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dbox_core::types::FolderId;

/// A node in the folder hierarchy. Only looked up by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Parent folder (`None` for top-level folders).
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a top-level folder.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
