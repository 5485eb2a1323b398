//! Object store trait for pluggable blob backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};

use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;

/// A byte stream used for reading and writing blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Metadata attached to a blob when it is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObjectMeta {
    /// MIME type stored alongside the blob.
    pub content_type: Option<String>,
    /// Declared length in bytes, if the caller knows it up front.
    pub content_length: Option<u64>,
}

/// Result of a successful `put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    /// Durable locator for the stored blob.
    pub locator: String,
    /// Number of bytes actually written.
    pub size_bytes: u64,
}

/// Blob storage used by the file lifecycle coordinator.
///
/// Every store is bound to a single bucket at construction time, so keys
/// are bucket-relative. Implementations must report a missing key as
/// [`ErrorKind::ObjectNotFound`]
/// and must treat `delete` of a missing key as success.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. "local", "s3").
    fn provider_type(&self) -> &str;

    /// The bucket this store writes into.
    fn bucket(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write a stream under `key`, replacing any existing object.
    async fn put(&self, key: &str, stream: ByteStream, meta: ObjectMeta) -> AppResult<PutOutcome>;

    /// Open the object under `key` for reading.
    async fn get(&self, key: &str) -> AppResult<ByteStream>;

    /// Server-side copy of `src` to `dst` within the bucket.
    async fn copy(&self, src: &str, dst: &str) -> AppResult<()>;

    /// Delete the object under `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Whether an object exists under `key`.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// The locator a blob stored under `key` is reachable at.
    fn locator_for(&self, key: &str) -> String;
}

/// Wrap an in-memory buffer as a single-chunk [`ByteStream`].
pub fn stream_from_bytes(data: impl Into<Bytes>) -> ByteStream {
    let data = data.into();
    Box::pin(futures::stream::once(async move { Ok(data) }))
}

/// Drain a [`ByteStream`] into one contiguous buffer.
pub async fn collect_stream(stream: ByteStream) -> AppResult<Bytes> {
    let chunks: Vec<Bytes> = stream
        .try_collect()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::ObjectStoreReadFailed, "Stream read error", e))?;
    let total = chunks.iter().map(Bytes::len).sum();
    let mut buf = Vec::with_capacity(total);
    for chunk in chunks {
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// Stream adapter that fails with `InvalidData` once more than `limit`
/// bytes have passed through.
pub fn limit_stream(stream: ByteStream, limit: u64) -> ByteStream {
    let mut seen = 0u64;
    Box::pin(stream.map(move |chunk| {
        let chunk = chunk?;
        seen += chunk.len() as u64;
        if seen > limit {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("stream exceeds {limit} bytes"),
            ));
        }
        Ok(chunk)
    }))
}
