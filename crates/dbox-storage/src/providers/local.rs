//! Local filesystem object store.
//!
//! Each bucket is a directory under the configured root; keys map to
//! relative paths inside it. Writes land in a temporary sibling file that is
//! renamed into place, so readers never see a partially written blob.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use dbox_core::error::{AppError, ErrorKind};
use dbox_core::result::AppResult;
use dbox_core::traits::object_store::{ByteStream, ObjectMeta, ObjectStore, PutOutcome};

use super::validate_key;

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Directory holding this bucket's objects.
    root: PathBuf,
    bucket: String,
    /// Prefix for locators; `file://` URLs when empty.
    base_url: String,
}

impl LocalObjectStore {
    /// Create a store for `bucket` under `root_path`, creating the directory.
    pub async fn new(root_path: &str, bucket: &str, base_url: &str) -> AppResult<Self> {
        validate_key(bucket)?;
        let root = PathBuf::from(root_path).join(bucket);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to create bucket directory: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            bucket: bucket.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::ObjectStoreWriteFailed,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    fn temp_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{name}.{}.part", uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn put(&self, key: &str, mut stream: ByteStream, _meta: ObjectMeta) -> AppResult<PutOutcome> {
        let path = self.resolve(key)?;
        self.ensure_parent(&path).await?;
        let temp = Self::temp_path(&path);

        let write_err = |msg: &str, e: std::io::Error| {
            AppError::with_source(ErrorKind::ObjectStoreWriteFailed, format!("{msg}: {key}"), e)
        };

        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| write_err("Failed to create object", e))?;

        let mut total_bytes = 0u64;
        let written: Result<(), AppError> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| write_err("Upload stream failed", e))?;
                total_bytes += chunk.len() as u64;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| write_err("Failed to write chunk", e))?;
            }
            file.sync_all()
                .await
                .map_err(|e| write_err("Failed to flush object", e))?;
            drop(file);
            fs::rename(&temp, &path)
                .await
                .map_err(|e| write_err("Failed to commit object", e))
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }

        debug!(key, bytes = total_bytes, "Stored object");
        Ok(PutOutcome {
            locator: self.locator_for(key),
            size_bytes: total_bytes,
        })
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let path = self.resolve(key)?;
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::object_not_found(key)
            } else {
                AppError::with_source(
                    ErrorKind::ObjectStoreReadFailed,
                    format!("Failed to open object: {key}"),
                    e,
                )
            }
        })?;

        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn copy(&self, src: &str, dst: &str) -> AppResult<()> {
        let from = self.resolve(src)?;
        let to = self.resolve(dst)?;
        self.ensure_parent(&to).await?;

        let temp = Self::temp_path(&to);
        let copied = match fs::copy(&from, &temp).await {
            Ok(_) => fs::rename(&temp, &to).await,
            Err(e) => Err(e),
        };

        if let Err(e) = copied {
            let _ = fs::remove_file(&temp).await;
            if e.kind() == std::io::ErrorKind::NotFound && !from.exists() {
                return Err(AppError::object_not_found(src));
            }
            return Err(AppError::with_source(
                ErrorKind::ObjectStoreWriteFailed,
                format!("Failed to copy {src} -> {dst}"),
                e,
            ));
        }

        debug!(src, dst, "Copied object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::ObjectStoreDeleteFailed,
                format!("Failed to delete object: {key}"),
                e,
            )),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        fs::try_exists(&path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ObjectStoreReadFailed,
                format!("Failed to stat object: {key}"),
                e,
            )
        })
    }

    fn locator_for(&self, key: &str) -> String {
        if self.base_url.is_empty() {
            format!("file://{}", self.root.join(key).display())
        } else {
            format!("{}/{}/{}", self.base_url, self.bucket, key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbox_core::traits::object_store::{collect_stream, stream_from_bytes};

    async fn store(dir: &tempfile::TempDir) -> LocalObjectStore {
        LocalObjectStore::new(dir.path().to_str().unwrap(), "bucket", "")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        let out = store
            .put("docs/a.txt", stream_from_bytes("hello world"), ObjectMeta::default())
            .await
            .unwrap();
        assert_eq!(out.size_bytes, 11);
        assert!(out.locator.starts_with("file://"));
        assert!(store.exists("docs/a.txt").await.unwrap());

        let data = collect_stream(store.get("docs/a.txt").await.unwrap()).await.unwrap();
        assert_eq!(&data[..], b"hello world");

        store.delete("docs/a.txt").await.unwrap();
        assert!(!store.exists("docs/a.txt").await.unwrap());
        // Deleting again is not an error.
        store.delete("docs/a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_copy_and_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;

        store
            .put("orig.txt", stream_from_bytes("content"), ObjectMeta::default())
            .await
            .unwrap();
        store.copy("orig.txt", "corig.txt").await.unwrap();
        assert!(store.exists("orig.txt").await.unwrap());
        let data = collect_stream(store.get("corig.txt").await.unwrap()).await.unwrap();
        assert_eq!(&data[..], b"content");

        let err = store.copy("missing.txt", "x.txt").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ObjectNotFound);
        let err = store.get("missing.txt").await.err().unwrap();
        assert_eq!(err.kind, ErrorKind::ObjectNotFound);
    }

    #[tokio::test]
    async fn test_base_url_locator() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let store = LocalObjectStore::new(root, "bucket", "http://localhost:8080/blobs/")
            .await
            .unwrap();
        assert_eq!(store.locator_for("a.txt"), "http://localhost:8080/blobs/bucket/a.txt");
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir).await;
        let err = store
            .put("../escape.txt", stream_from_bytes("x"), ObjectMeta::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
