//! Soft-delete state of a file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a file is live or sitting in the trash.
///
/// Stored as an `is_deleted` flag plus a nullable `deleted_at` column; the
/// enum makes "flag set without a timestamp" unrepresentable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrashState {
    /// Visible and usable.
    #[default]
    Active,
    /// Soft-deleted at `since`; the blob is kept so the file can be restored.
    Trashed {
        /// When the file was moved to the trash.
        since: DateTime<Utc>,
    },
}

impl TrashState {
    /// Whether this is the trashed state.
    pub fn is_trashed(&self) -> bool {
        matches!(self, Self::Trashed { .. })
    }

    /// When the file was trashed, if it is.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Trashed { since } => Some(*since),
        }
    }

    /// Rebuild the state from its column pair. Returns `None` for the
    /// inconsistent combinations.
    pub fn from_columns(is_deleted: bool, deleted_at: Option<DateTime<Utc>>) -> Option<Self> {
        match (is_deleted, deleted_at) {
            (false, None) => Some(Self::Active),
            (true, Some(since)) => Some(Self::Trashed { since }),
            _ => None,
        }
    }
}
