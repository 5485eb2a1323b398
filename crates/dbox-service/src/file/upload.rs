//! Batch upload.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::TryStreamExt;
use futures::future::join_all;
use tracing::info;

use dbox_core::error::{AppError, ErrorKind};
use dbox_core::result::AppResult;
use dbox_core::traits::object_store::{ByteStream, ObjectMeta, limit_stream};
use dbox_core::types::FolderId;
use dbox_entity::file::{File, NewFile};

use super::coordinator::FileCoordinator;
use super::naming::validate_name;

/// Content type recorded when the client sends none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One file in an upload request.
pub struct UploadItem {
    /// Original file name; also the storage key.
    pub name: String,
    /// MIME type declared by the client.
    pub content_type: Option<String>,
    /// Size declared by the client.
    pub size_bytes: u64,
    /// File contents.
    pub stream: ByteStream,
}

impl UploadItem {
    /// Build an item from an in-memory buffer.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<bytes::Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            content_type,
            size_bytes: data.len() as u64,
            stream: dbox_core::traits::object_store::stream_from_bytes(data),
        }
    }
}

impl std::fmt::Debug for UploadItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadItem")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

impl FileCoordinator {
    /// Uploads a batch of files into a folder (`None` for the root).
    ///
    /// The call fails as a whole only if the folder does not resolve.
    /// Otherwise each item gets its own result, in input order, and a failed
    /// item never affects the others.
    pub async fn upload(
        &self,
        folder_id: Option<FolderId>,
        items: Vec<UploadItem>,
    ) -> AppResult<Vec<AppResult<File>>> {
        let folder_id = self.resolve_folder(folder_id).await?;
        let count = items.len();

        let results = join_all(
            items
                .into_iter()
                .map(|item| self.upload_one(folder_id, item)),
        )
        .await;

        let stored = results.iter().filter(|r| r.is_ok()).count();
        info!(folder_id = ?folder_id, items = count, stored, "Upload batch finished");
        Ok(results)
    }

    async fn upload_one(&self, folder_id: Option<FolderId>, item: UploadItem) -> AppResult<File> {
        validate_name(&item.name)?;
        if item.size_bytes > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "{} is {} bytes, limit is {}",
                item.name, item.size_bytes, self.max_upload_size_bytes
            )));
        }

        let key = item.name.clone();
        let content_type = item
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let _key_guard = self.claim_key(&key).await?;

        let oversized = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&oversized);
        let body: ByteStream = Box::pin(
            limit_stream(item.stream, self.max_upload_size_bytes).inspect_err(move |e| {
                if e.kind() == std::io::ErrorKind::InvalidData {
                    flag.store(true, Ordering::Relaxed);
                }
            }),
        );
        let meta = ObjectMeta {
            content_type: Some(content_type.clone()),
            content_length: Some(item.size_bytes),
        };

        let outcome = match self
            .object_call(
                ErrorKind::ObjectStoreWriteFailed,
                "put",
                self.objects.put(&key, body, meta),
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.discard_partial(&key, &e, "upload: put failed").await;
                if oversized.load(Ordering::Relaxed) {
                    return Err(AppError::validation(format!(
                        "{} exceeds the {} byte upload limit",
                        item.name, self.max_upload_size_bytes
                    )));
                }
                return Err(e);
            }
        };

        let record = NewFile {
            folder_id,
            name: item.name,
            content_type,
            size_bytes: outcome.size_bytes as i64,
            storage_key: key.clone(),
            locator: outcome.locator,
        };

        match self.files.create(&record).await {
            Ok(file) => {
                info!(
                    file_id = %file.id,
                    name = %file.name,
                    size_bytes = file.size_bytes,
                    "File uploaded"
                );
                Ok(file)
            }
            Err(e) => {
                self.discard_blob(&key, "upload: metadata create failed")
                    .await;
                Err(e)
            }
        }
    }
}
