//! Orphan ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dbox_core::types::OrphanId;

/// A storage key whose blob may exist without a metadata record.
///
/// Written when a compensating delete fails or when an old blob could not be
/// removed after a rename. Drained by the orphan sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrphanBlob {
    /// Ledger entry identifier.
    pub id: OrphanId,
    /// Object-store key.
    pub storage_key: String,
    /// Which step left the blob behind.
    pub reason: String,
    /// Failed sweep attempts so far.
    pub attempts: i32,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}
