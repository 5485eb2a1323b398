//! The file lifecycle coordinator.
//!
//! Write ordering per operation:
//!
//! | operation            | object store                 | metadata            |
//! |----------------------|------------------------------|---------------------|
//! | upload               | 1. put                       | 2. create           |
//! | rename               | 1. copy old→new, 3. del old  | 2. update           |
//! | copy                 | 1. copy src→dst              | 2. create           |
//! | delete permanently   | 1. delete                    | 2. delete           |
//! | trash/restore/move   | none                         | update              |
//!
//! When the metadata step fails after a blob was written, that blob is
//! deleted again; if that also fails its key goes to the orphan ledger.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info, warn};

use dbox_core::config::CoordinatorConfig;
use dbox_core::error::{AppError, ErrorKind};
use dbox_core::result::AppResult;
use dbox_core::traits::object_store::{ObjectStore, collect_stream};
use dbox_core::types::{FileId, FolderId};
use dbox_database::store::{FileStore, FolderStore, OrphanStore};
use dbox_entity::file::{File, NewFile, TrashState};

use super::guard::bounded;
use super::locks::{KeyedGuard, KeyedLocks};
use super::naming::{copy_candidates, validate_name};

/// Sequences object-store and metadata-store writes for every file action.
pub struct FileCoordinator {
    pub(super) files: Arc<dyn FileStore>,
    pub(super) folders: Arc<dyn FolderStore>,
    pub(super) orphans: Arc<dyn OrphanStore>,
    pub(super) objects: Arc<dyn ObjectStore>,
    pub(super) config: CoordinatorConfig,
    pub(super) max_upload_size_bytes: u64,
    /// Serializes operations on one file record.
    pub(super) file_locks: KeyedLocks<FileId>,
    /// Serializes writers of one object-store key. Always taken after the
    /// file lock, and never more than one at a time.
    pub(super) key_locks: KeyedLocks<String>,
}

impl std::fmt::Debug for FileCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCoordinator")
            .field("object_store", &self.objects.provider_type())
            .field("bucket", &self.objects.bucket())
            .finish()
    }
}

impl FileCoordinator {
    /// Creates a new coordinator.
    pub fn new(
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
        orphans: Arc<dyn OrphanStore>,
        objects: Arc<dyn ObjectStore>,
        config: CoordinatorConfig,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            files,
            folders,
            orphans,
            objects,
            config,
            max_upload_size_bytes,
            file_locks: KeyedLocks::new(),
            key_locks: KeyedLocks::new(),
        }
    }

    /// Gets a file record.
    pub async fn get_file_by_id(&self, file_id: FileId) -> AppResult<File> {
        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Gets a file's current name.
    pub async fn get_file_name(&self, file_id: FileId) -> AppResult<String> {
        Ok(self.get_file_by_id(file_id).await?.name)
    }

    /// Renames a file; the blob moves to a key matching the new name.
    ///
    /// The copy happens first, so a failed copy leaves the record and the
    /// original blob untouched. The original blob is removed only after the
    /// record points at the new key.
    pub async fn rename(&self, file_id: FileId, new_name: &str) -> AppResult<File> {
        validate_name(new_name)?;
        let _file_guard = self.file_locks.lock(file_id).await;
        let mut file = self.get_file_by_id(file_id).await?;

        if file.storage_key == new_name {
            if file.name == new_name {
                return Ok(file);
            }
            file.name = new_name.to_string();
            return self.files.update(&file).await;
        }

        let new_key = new_name.to_string();
        let _key_guard = self.claim_key(&new_key).await?;

        if let Err(e) = self
            .object_call(
                ErrorKind::ObjectStoreWriteFailed,
                "copy for rename",
                self.objects.copy(&file.storage_key, &new_key),
            )
            .await
        {
            self.discard_partial(&new_key, &e, "rename: copy failed").await;
            return Err(e);
        }

        let old_key = std::mem::replace(&mut file.storage_key, new_key.clone());
        let old_name = std::mem::replace(&mut file.name, new_name.to_string());
        file.locator = self.objects.locator_for(&new_key);

        let updated = match self.files.update(&file).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard_blob(&new_key, "rename: metadata update failed")
                    .await;
                return Err(e);
            }
        };

        if let Err(e) = self
            .object_call(
                ErrorKind::ObjectStoreDeleteFailed,
                "delete after rename",
                self.objects.delete(&old_key),
            )
            .await
        {
            warn!(
                file_id = %file_id,
                old_key = %old_key,
                error = %e,
                "Renamed file but could not delete the previous blob"
            );
            self.record_orphan(&old_key, "rename: previous blob delete failed")
                .await;
        }

        info!(file_id = %file_id, from = %old_name, to = %updated.name, "File renamed");
        Ok(updated)
    }

    /// Moves a file to the trash. Trashing a trashed file changes nothing.
    pub async fn trash(&self, file_id: FileId) -> AppResult<File> {
        let _guard = self.file_locks.lock(file_id).await;
        let mut file = self.get_file_by_id(file_id).await?;
        if file.is_trashed() {
            return Ok(file);
        }

        file.state = TrashState::Trashed { since: Utc::now() };
        let file = self.files.update(&file).await?;

        info!(file_id = %file_id, name = %file.name, "File trashed");
        Ok(file)
    }

    /// Restores a file from the trash. Restoring an active file changes
    /// nothing.
    pub async fn restore(&self, file_id: FileId) -> AppResult<File> {
        let _guard = self.file_locks.lock(file_id).await;
        let mut file = self.get_file_by_id(file_id).await?;
        if !file.is_trashed() {
            return Ok(file);
        }

        file.state = TrashState::Active;
        let file = self.files.update(&file).await?;

        info!(file_id = %file_id, name = %file.name, "File restored");
        Ok(file)
    }

    /// Deletes the blob, then the record.
    ///
    /// If the blob delete fails the record is kept. If the record delete
    /// fails the blob is already gone; calling this again finishes the job
    /// because deleting a missing blob succeeds.
    pub async fn delete_permanently(&self, file_id: FileId) -> AppResult<()> {
        let _file_guard = self.file_locks.lock(file_id).await;
        let file = self.get_file_by_id(file_id).await?;
        let _key_guard = self.key_locks.lock(file.storage_key.clone()).await;

        self.object_call(
            ErrorKind::ObjectStoreDeleteFailed,
            "delete",
            self.objects.delete(&file.storage_key),
        )
        .await?;

        if let Err(e) = self.files.delete_by_id(file_id).await {
            error!(
                file_id = %file_id,
                storage_key = %file.storage_key,
                error = %e,
                "Blob deleted but metadata delete failed; retry to finish"
            );
            return Err(e);
        }

        info!(file_id = %file_id, name = %file.name, "File permanently deleted");
        Ok(())
    }

    /// Moves a file to another folder (`None` for the root). Metadata only.
    pub async fn move_file(&self, file_id: FileId, target: Option<FolderId>) -> AppResult<File> {
        let _guard = self.file_locks.lock(file_id).await;
        let mut file = self.get_file_by_id(file_id).await?;
        let target = self.resolve_folder(target).await?;

        if file.folder_id == target {
            return Ok(file);
        }

        let from = file.folder_id;
        file.folder_id = target;
        let file = self.files.update(&file).await?;

        info!(
            file_id = %file_id,
            from_folder = ?from,
            to_folder = ?target,
            "File moved"
        );
        Ok(file)
    }

    /// Copies a file into a folder under a prefixed name.
    ///
    /// The first free name from [`copy_candidates`] is used; a candidate is
    /// taken if neither a blob nor a record uses it as a key.
    pub async fn copy(&self, file_id: FileId, target: Option<FolderId>) -> AppResult<File> {
        let _file_guard = self.file_locks.lock(file_id).await;
        let source = self.get_file_by_id(file_id).await?;
        let target = self.resolve_folder(target).await?;

        let (new_key, _key_guard) = self.claim_copy_name(&source.name).await?;

        if let Err(e) = self
            .object_call(
                ErrorKind::ObjectStoreWriteFailed,
                "copy",
                self.objects.copy(&source.storage_key, &new_key),
            )
            .await
        {
            self.discard_partial(&new_key, &e, "copy: object copy failed")
                .await;
            return Err(e);
        }

        let record = NewFile {
            folder_id: target,
            name: new_key.clone(),
            content_type: source.content_type.clone(),
            size_bytes: source.size_bytes,
            storage_key: new_key.clone(),
            locator: self.objects.locator_for(&new_key),
        };

        let copy = match self.files.create(&record).await {
            Ok(copy) => copy,
            Err(e) => {
                self.discard_blob(&new_key, "copy: metadata create failed")
                    .await;
                return Err(e);
            }
        };

        info!(
            source_id = %file_id,
            new_id = %copy.id,
            name = %copy.name,
            "File copied"
        );
        Ok(copy)
    }

    /// Reads a whole blob into memory.
    pub async fn download(&self, storage_name: &str) -> AppResult<Bytes> {
        self.object_call(ErrorKind::ObjectStoreReadFailed, "download", async {
            let stream = self.objects.get(storage_name).await?;
            collect_stream(stream).await
        })
        .await
    }

    /// Resolve an optional folder id, failing with `NotFound` if it is set
    /// but does not exist.
    pub(super) async fn resolve_folder(
        &self,
        folder_id: Option<FolderId>,
    ) -> AppResult<Option<FolderId>> {
        let Some(folder_id) = folder_id else {
            return Ok(None);
        };
        self.folders
            .find_by_id(folder_id)
            .await?
            .map(|folder| Some(folder.id))
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    /// Run an object-store call under the configured timeout.
    pub(super) async fn object_call<T>(
        &self,
        kind: ErrorKind,
        step: &str,
        call: impl std::future::Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        bounded(self.config.object_store_timeout(), kind, step, call).await
    }

    /// Lock `key` and make sure nothing uses it yet. Only called ahead of a
    /// write, so a failed existence check reports as a failed write.
    pub(super) async fn claim_key(&self, key: &str) -> AppResult<KeyedGuard<String>> {
        let guard = self.key_locks.lock(key.to_string()).await;
        if self.key_in_use(key).await? {
            return Err(AppError::conflict(format!(
                "A file stored as '{key}' already exists"
            )));
        }
        Ok(guard)
    }

    async fn claim_copy_name(&self, name: &str) -> AppResult<(String, KeyedGuard<String>)> {
        for candidate in copy_candidates(&self.config.copy_prefix, name, self.config.max_copy_suffix)
        {
            validate_name(&candidate)?;
            match self.claim_key(&candidate).await {
                Ok(guard) => return Ok((candidate, guard)),
                Err(e) if e.is(ErrorKind::Conflict) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(AppError::conflict(format!(
            "No free copy name for '{name}' after {} attempts",
            self.config.max_copy_suffix + 1
        )))
    }

    async fn key_in_use(&self, key: &str) -> AppResult<bool> {
        if self.files.find_by_storage_key(key).await?.is_some() {
            return Ok(true);
        }
        self.object_call(
            ErrorKind::ObjectStoreWriteFailed,
            "existence check",
            self.objects.exists(key),
        )
        .await
    }

    /// Best-effort removal of a blob this operation wrote. Falls back to the
    /// orphan ledger.
    pub(super) async fn discard_blob(&self, key: &str, reason: &str) {
        match self
            .object_call(
                ErrorKind::ObjectStoreDeleteFailed,
                "compensating delete",
                self.objects.delete(key),
            )
            .await
        {
            Ok(()) => warn!(storage_key = %key, reason, "Rolled back blob write"),
            Err(e) => {
                warn!(storage_key = %key, reason, error = %e, "Rollback of blob write failed");
                self.record_orphan(key, reason).await;
            }
        }
    }

    /// Clean up after a failed copy or put. A timed-out write may still land,
    /// so the destination is removed unless the source was simply missing.
    /// The key was verified free under its lock, so nothing else lives there.
    pub(super) async fn discard_partial(&self, key: &str, cause: &AppError, reason: &str) {
        if cause.is(ErrorKind::ObjectNotFound) || cause.is(ErrorKind::Validation) {
            return;
        }
        self.discard_blob(key, reason).await;
    }

    pub(super) async fn record_orphan(&self, key: &str, reason: &str) {
        match self.orphans.record(key, reason).await {
            Ok(entry) => warn!(orphan_id = %entry.id, storage_key = %key, reason, "Recorded orphan blob"),
            Err(e) => error!(
                storage_key = %key,
                reason,
                error = %e,
                "Could not record orphan blob; manual cleanup required"
            ),
        }
    }
}
