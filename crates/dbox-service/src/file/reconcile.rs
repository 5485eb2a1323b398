//! Orphan blob reconciliation.
//!
//! Blobs end up in the ledger when a compensating delete fails, or when a
//! rename cannot remove the blob it moved away from. The sweep retries those
//! deletes, but never touches a key that a file record still points at.

use serde::Serialize;
use tracing::{debug, info, warn};

use dbox_core::error::ErrorKind;
use dbox_core::result::AppResult;
use dbox_entity::OrphanBlob;

use super::coordinator::FileCoordinator;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Ledger entries looked at.
    pub examined: usize,
    /// Blobs deleted (or already gone).
    pub reclaimed: usize,
    /// Entries dropped because a file record uses the key again.
    pub retained: usize,
    /// Entries whose delete failed; they stay in the ledger.
    pub failed: usize,
}

enum EntryOutcome {
    Reclaimed,
    Retained,
    Failed,
}

impl FileCoordinator {
    /// Works through the oldest ledger entries, up to the configured batch
    /// size.
    pub async fn sweep_orphans(&self) -> AppResult<SweepReport> {
        let entries = self
            .orphans
            .list_oldest(self.config.sweep_batch_size)
            .await?;

        let mut report = SweepReport {
            examined: entries.len(),
            ..SweepReport::default()
        };

        for entry in &entries {
            match self.reconcile_entry(entry).await? {
                EntryOutcome::Reclaimed => report.reclaimed += 1,
                EntryOutcome::Retained => report.retained += 1,
                EntryOutcome::Failed => report.failed += 1,
            }
        }

        if report.examined > 0 {
            info!(
                examined = report.examined,
                reclaimed = report.reclaimed,
                retained = report.retained,
                failed = report.failed,
                "Orphan sweep finished"
            );
        }
        Ok(report)
    }

    async fn reconcile_entry(&self, entry: &OrphanBlob) -> AppResult<EntryOutcome> {
        let _key_guard = self.key_locks.lock(entry.storage_key.clone()).await;

        if self
            .files
            .find_by_storage_key(&entry.storage_key)
            .await?
            .is_some()
        {
            debug!(storage_key = %entry.storage_key, "Orphan key is referenced again, dropping entry");
            self.orphans.remove(entry.id).await?;
            return Ok(EntryOutcome::Retained);
        }

        let deleted = self
            .object_call(
                ErrorKind::ObjectStoreDeleteFailed,
                "orphan delete",
                self.objects.delete(&entry.storage_key),
            )
            .await;

        match deleted {
            Ok(()) => {
                self.orphans.remove(entry.id).await?;
                debug!(storage_key = %entry.storage_key, "Reclaimed orphan blob");
                Ok(EntryOutcome::Reclaimed)
            }
            Err(e) if e.is(ErrorKind::ObjectNotFound) => {
                self.orphans.remove(entry.id).await?;
                Ok(EntryOutcome::Reclaimed)
            }
            Err(e) => {
                warn!(
                    orphan_id = %entry.id,
                    storage_key = %entry.storage_key,
                    attempts = entry.attempts + 1,
                    error = %e,
                    "Orphan delete failed"
                );
                self.orphans.bump_attempts(entry.id).await?;
                Ok(EntryOutcome::Failed)
            }
        }
    }
}
