//! Shared test helpers: in-memory metadata stores and an object store, each
//! with switches to make individual calls fail.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use dbox_core::config::CoordinatorConfig;
use dbox_core::error::AppError;
use dbox_core::result::AppResult;
use dbox_core::traits::object_store::{ByteStream, ObjectMeta, ObjectStore, PutOutcome};
use dbox_core::types::{FileId, FolderId, OrphanId};
use dbox_database::store::{FileStore, FolderStore, OrphanStore};
use dbox_entity::{File, Folder, NewFile, OrphanBlob, TrashState};
use dbox_service::{FileCoordinator, UploadItem};
use dbox_storage::providers::memory::MemoryObjectStore;

/// Upload limit used by the harness.
pub const MAX_UPLOAD: u64 = 1024;

fn injected(what: &str) -> AppError {
    AppError::internal(format!("injected failure: {what}"))
}

/// File records in a map, with a unique storage key like the real table.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    rows: DashMap<FileId, File>,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl MemoryFileStore {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn key_taken(&self, key: &str, except: Option<FileId>) -> bool {
        self.rows
            .iter()
            .any(|r| r.storage_key == key && Some(r.id) != except)
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn create(&self, data: &NewFile) -> AppResult<File> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::metadata_write("injected failure: create"));
        }
        if self.key_taken(&data.storage_key, None) {
            return Err(AppError::conflict("storage key taken"));
        }
        let now = Utc::now();
        let file = File {
            id: FileId::new(),
            folder_id: data.folder_id,
            name: data.name.clone(),
            content_type: data.content_type.clone(),
            size_bytes: data.size_bytes,
            storage_key: data.storage_key.clone(),
            locator: data.locator.clone(),
            state: TrashState::Active,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(file.id, file.clone());
        Ok(file)
    }

    async fn update(&self, file: &File) -> AppResult<File> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(AppError::metadata_write("injected failure: update"));
        }
        if !self.rows.contains_key(&file.id) {
            return Err(AppError::not_found(format!("File {} not found", file.id)));
        }
        if self.key_taken(&file.storage_key, Some(file.id)) {
            return Err(AppError::conflict("storage key taken"));
        }
        let mut stored = file.clone();
        stored.updated_at = Utc::now();
        self.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        Ok(self.rows.get(&id).map(|r| r.clone()))
    }

    async fn find_by_storage_key(&self, storage_key: &str) -> AppResult<Option<File>> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.storage_key == storage_key)
            .map(|r| r.clone()))
    }

    async fn delete_by_id(&self, id: FileId) -> AppResult<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::metadata_write("injected failure: delete"));
        }
        Ok(self.rows.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryFolderStore {
    rows: DashMap<FolderId, Folder>,
}

impl MemoryFolderStore {
    pub fn add(&self, name: &str) -> FolderId {
        let folder = Folder {
            id: FolderId::new(),
            parent_id: None,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let id = folder.id;
        self.rows.insert(id, folder);
        id
    }
}

#[async_trait]
impl FolderStore for MemoryFolderStore {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.rows.get(&id).map(|r| r.clone()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryOrphanStore {
    rows: Mutex<Vec<OrphanBlob>>,
}

impl MemoryOrphanStore {
    pub fn keys(&self) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.storage_key.clone())
            .collect()
    }

    pub fn attempts(&self, key: &str) -> Option<i32> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.storage_key == key)
            .map(|r| r.attempts)
    }
}

#[async_trait]
impl OrphanStore for MemoryOrphanStore {
    async fn record(&self, storage_key: &str, reason: &str) -> AppResult<OrphanBlob> {
        let entry = OrphanBlob {
            id: OrphanId::new(),
            storage_key: storage_key.to_string(),
            reason: reason.to_string(),
            attempts: 0,
            recorded_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn list_oldest(&self, limit: u32) -> AppResult<Vec<OrphanBlob>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().take(limit as usize).cloned().collect())
    }

    async fn remove(&self, id: OrphanId) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }

    async fn bump_attempts(&self, id: OrphanId) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(entry) = rows.iter_mut().find(|r| r.id == id) {
            entry.attempts += 1;
        }
        Ok(())
    }
}

/// [`MemoryObjectStore`] with failure switches and an optional delay.
#[derive(Debug)]
pub struct FaultyObjectStore {
    pub inner: MemoryObjectStore,
    pub fail_put: AtomicBool,
    pub fail_copy: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_get: AtomicBool,
    pub fail_exists: AtomicBool,
    /// Milliseconds every call sleeps before running.
    pub delay_ms: AtomicU64,
    pub deletes: AtomicUsize,
}

impl FaultyObjectStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryObjectStore::new("test"),
            fail_put: AtomicBool::new(false),
            fail_copy: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_get: AtomicBool::new(false),
            fail_exists: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    async fn pause(&self) {
        let ms = self.delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl ObjectStore for FaultyObjectStore {
    fn provider_type(&self) -> &str {
        "faulty-memory"
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &str, stream: ByteStream, meta: ObjectMeta) -> AppResult<PutOutcome> {
        self.pause().await;
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(injected("put"));
        }
        self.inner.put(key, stream, meta).await
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        self.pause().await;
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(injected("get"));
        }
        self.inner.get(key).await
    }

    async fn copy(&self, src: &str, dst: &str) -> AppResult<()> {
        self.pause().await;
        if self.fail_copy.load(Ordering::SeqCst) {
            return Err(injected("copy"));
        }
        self.inner.copy(src, dst).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.pause().await;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected("delete"));
        }
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.pause().await;
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(injected("exists"));
        }
        self.inner.exists(key).await
    }

    fn locator_for(&self, key: &str) -> String {
        self.inner.locator_for(key)
    }
}

/// A coordinator wired to in-memory stores.
pub struct Harness {
    pub coordinator: Arc<FileCoordinator>,
    pub files: Arc<MemoryFileStore>,
    pub folders: Arc<MemoryFolderStore>,
    pub orphans: Arc<MemoryOrphanStore>,
    pub objects: Arc<FaultyObjectStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    pub fn with_config(config: CoordinatorConfig) -> Self {
        let files = Arc::new(MemoryFileStore::default());
        let folders = Arc::new(MemoryFolderStore::default());
        let orphans = Arc::new(MemoryOrphanStore::default());
        let objects = Arc::new(FaultyObjectStore::new());

        let coordinator = Arc::new(FileCoordinator::new(
            files.clone(),
            folders.clone(),
            orphans.clone(),
            objects.clone(),
            config,
            MAX_UPLOAD,
        ));

        Self {
            coordinator,
            files,
            folders,
            orphans,
            objects,
        }
    }

    /// Upload one file to the root and return its record.
    pub async fn put(&self, name: &str, data: &'static [u8]) -> File {
        self.put_in(None, name, data).await
    }

    pub async fn put_in(&self, folder: Option<FolderId>, name: &str, data: &'static [u8]) -> File {
        let item = UploadItem::from_bytes(name, Some("text/plain".into()), data);
        self.coordinator
            .upload(folder, vec![item])
            .await
            .expect("folder resolves")
            .remove(0)
            .expect("upload succeeds")
    }

    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }
}
