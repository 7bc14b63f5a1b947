use crate::keys;
use crate::progress::{chunked_with_progress, ProgressCallback, TransferProgress};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use campground_core::constants::{TRANSFER_CHUNK_SIZE, UPLOAD_URL_TTL_SECS};
use campground_core::models::UploadAuthorization;
use chrono::Utc;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::time::Duration;

/// S3 storage implementation
///
/// Existing campgrounds get presigned PUT URLs; the bytes are then streamed to
/// that URL in chunks so progress can be observed. Direct uploads use the
/// object store client.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    http: reqwest::Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    upload_url_ttl: Duration,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            http,
            bucket,
            region,
            endpoint_url,
            upload_url_ttl: Duration::from_secs(UPLOAD_URL_TTL_SECS),
        })
    }

    pub fn with_upload_url_ttl(mut self, ttl: Duration) -> Self {
        self.upload_url_ttl = ttl;
        self
    }

    fn generate_url(&self, key: &str) -> String {
        object_url(
            self.endpoint_url.as_deref(),
            &self.bucket,
            &self.region,
            key,
        )
    }
}

/// Public URL for an S3 object
///
/// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
/// For S3-compatible providers, uses path-style: {endpoint}/{bucket}/{key}
fn object_url(endpoint: Option<&str>, bucket: &str, region: &str, key: &str) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn authorize(
        &self,
        campground_id: i64,
        original_filename: &str,
        content_type: &str,
    ) -> StorageResult<UploadAuthorization> {
        let key = keys::authorized_key(campground_id, original_filename, content_type);
        let location = Path::from(key.clone());

        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::PUT, &location, self.upload_url_ttl)
            .await;

        let signed_url = url_result
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 presign failed"
                );
                StorageError::AuthorizationFailed(e.to_string())
            })?
            .to_string();

        let ttl = chrono::Duration::from_std(self.upload_url_ttl)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(UploadAuthorization {
            path: key,
            signed_url,
            expires_at: Utc::now() + ttl,
        })
    }

    async fn transfer(
        &self,
        authorization: &UploadAuthorization,
        content_type: &str,
        data: Bytes,
        on_progress: ProgressCallback,
    ) -> StorageResult<()> {
        if authorization.is_expired() {
            return Err(StorageError::AuthorizationFailed(
                "Upload URL has expired".to_string(),
            ));
        }

        let size = data.len() as u64;
        let start = std::time::Instant::now();

        on_progress(TransferProgress::started(size));
        let body = reqwest::Body::wrap_stream(chunked_with_progress(
            data,
            TRANSFER_CHUNK_SIZE,
            on_progress.clone(),
        ));

        let response = self
            .http
            .put(&authorization.signed_url)
            .header(http::header::CONTENT_TYPE, content_type)
            .header(http::header::CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %authorization.path,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 transfer failed"
                );
                StorageError::TransferFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                status = status.as_u16(),
                bucket = %self.bucket,
                key = %authorization.path,
                "S3 rejected transfer"
            );
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        on_progress(TransferProgress::completed(size));

        tracing::info!(
            bucket = %self.bucket,
            key = %authorization.path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 transfer successful"
        );

        Ok(())
    }

    async fn upload_direct(
        &self,
        namespace: &str,
        original_filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        let key = keys::direct_key(namespace, original_filename, content_type)?;
        let size = data.len() as u64;
        let location = Path::from(key.clone());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 direct upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 direct upload successful"
        );

        Ok(key)
    }

    fn public_url(&self, storage_key: &str) -> String {
        self.generate_url(storage_key)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Path::from(storage_key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
