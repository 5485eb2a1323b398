//! In-process object store.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use dbox_core::error::AppError;
use dbox_core::result::AppResult;
use dbox_core::traits::object_store::{
    ByteStream, ObjectMeta, ObjectStore, PutOutcome, collect_stream, stream_from_bytes,
};

use super::validate_key;

/// Object store that keeps every blob in memory.
///
/// Used by the `memory` provider setting and by tests.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    bucket: String,
    objects: DashMap<String, (Bytes, ObjectMeta)>,
}

impl MemoryObjectStore {
    /// Create an empty store for `bucket`.
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: DashMap::new(),
        }
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Stored content type for `key`, if present.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .get(key)
            .and_then(|entry| entry.value().1.content_type.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &str, stream: ByteStream, meta: ObjectMeta) -> AppResult<PutOutcome> {
        validate_key(key)?;
        let data = collect_stream(stream)
            .await
            .map_err(|e| AppError::object_write(format!("Failed to buffer {key}: {e}")))?;
        let size_bytes = data.len() as u64;
        self.objects.insert(key.to_string(), (data, meta));
        Ok(PutOutcome {
            locator: self.locator_for(key),
            size_bytes,
        })
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let data = self
            .objects
            .get(key)
            .map(|entry| entry.value().0.clone())
            .ok_or_else(|| AppError::object_not_found(key))?;
        Ok(stream_from_bytes(data))
    }

    async fn copy(&self, src: &str, dst: &str) -> AppResult<()> {
        validate_key(dst)?;
        let value = self
            .objects
            .get(src)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::object_not_found(src))?;
        self.objects.insert(dst.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.objects.contains_key(key))
    }

    fn locator_for(&self, key: &str) -> String {
        format!("memory://{}/{}", self.bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbox_core::ErrorKind;

    #[tokio::test]
    async fn test_put_get_copy_delete() {
        let store = MemoryObjectStore::new("test");
        let meta = ObjectMeta {
            content_type: Some("text/plain".into()),
            content_length: Some(2),
        };
        let out = store.put("a.txt", stream_from_bytes("hi"), meta).await.unwrap();
        assert_eq!(out.size_bytes, 2);
        assert_eq!(out.locator, "memory://test/a.txt");

        store.copy("a.txt", "ca.txt").await.unwrap();
        let copied = collect_stream(store.get("ca.txt").await.unwrap()).await.unwrap();
        assert_eq!(&copied[..], b"hi");
        assert_eq!(store.content_type("ca.txt").as_deref(), Some("text/plain"));

        store.delete("a.txt").await.unwrap();
        store.delete("a.txt").await.unwrap();
        assert!(!store.exists("a.txt").await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_object_not_found() {
        let store = MemoryObjectStore::new("test");
        let err = store.get("nope").await.err().unwrap();
        assert_eq!(err.kind, ErrorKind::ObjectNotFound);
        let err = store.copy("nope", "other").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ObjectNotFound);
    }
}
