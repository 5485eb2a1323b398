//! S3-compatible object store (requires the `s3` feature).

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream as S3Body;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use dbox_core::config::S3StorageConfig;
use dbox_core::error::{AppError, ErrorKind};
use dbox_core::result::AppResult;
use dbox_core::traits::object_store::{
    ByteStream, ObjectMeta, ObjectStore, PutOutcome, collect_stream,
};

use super::validate_key;

/// S3-compatible object store bound to one bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
    endpoint: String,
}

impl S3ObjectStore {
    /// Create a client from configuration. Static credentials are used when
    /// an access key is configured, otherwise the default AWS chain.
    pub async fn new(bucket: &str, config: &S3StorageConfig) -> AppResult<Self> {
        if bucket.is_empty() {
            return Err(AppError::configuration("S3 bucket name is empty"));
        }
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket,
            "Initializing S3 object store"
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(&config.endpoint);
        }
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                &config.access_key,
                &config.secret_key,
                None,
                None,
                "dbox-config",
            ));
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: bucket.to_string(),
            region: config.region.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// `CopySource` value: bucket plus the percent-encoded key.
    fn copy_source(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.bucket, encoded.join("/"))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn health_check(&self) -> AppResult<bool> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(bucket = %self.bucket, error = %e, "S3 health check failed");
                Ok(false)
            }
        }
    }

    async fn put(&self, key: &str, stream: ByteStream, meta: ObjectMeta) -> AppResult<PutOutcome> {
        validate_key(key)?;
        // PutObject needs a known length, so the body is buffered first.
        let data = collect_stream(stream)
            .await
            .map_err(|e| e.into_kind(ErrorKind::ObjectStoreWriteFailed))?;
        let size_bytes = data.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(meta.content_type)
            .content_length(size_bytes as i64)
            .body(S3Body::from(data))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ObjectStoreWriteFailed,
                    format!("S3 put failed: {key}"),
                    e,
                )
            })?;

        debug!(key, bytes = size_bytes, "Stored S3 object");
        Ok(PutOutcome {
            locator: self.locator_for(key),
            size_bytes,
        })
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::object_not_found(key)
                } else {
                    AppError::with_source(
                        ErrorKind::ObjectStoreReadFailed,
                        format!("S3 get failed: {key}"),
                        e,
                    )
                }
            })?;

        Ok(Box::pin(ReaderStream::new(output.body.into_async_read())))
    }

    async fn copy(&self, src: &str, dst: &str) -> AppResult<()> {
        validate_key(dst)?;
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(self.copy_source(src))
            .key(dst)
            .send()
            .await
            .map_err(|e| {
                if e.code() == Some("NoSuchKey") {
                    AppError::object_not_found(src)
                } else {
                    AppError::with_source(
                        ErrorKind::ObjectStoreWriteFailed,
                        format!("S3 copy failed: {src} -> {dst}"),
                        e,
                    )
                }
            })?;

        debug!(src, dst, "Copied S3 object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ObjectStoreDeleteFailed,
                    format!("S3 delete failed: {key}"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::ObjectStoreReadFailed,
                format!("S3 head failed: {key}"),
                e,
            )),
        }
    }

    fn locator_for(&self, key: &str) -> String {
        if self.endpoint.is_empty() {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        } else {
            format!("{}/{}/{}", self.endpoint, self.bucket, key)
        }
    }
}
