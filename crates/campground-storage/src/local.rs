use crate::keys;
use crate::progress::{ProgressCallback, TransferProgress};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use campground_core::constants::{TRANSFER_CHUNK_SIZE, UPLOAD_URL_TTL_SECS};
use campground_core::models::UploadAuthorization;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

type HmacSha256 = Hmac<Sha256>;

/// Local filesystem storage implementation
///
/// Signed upload URLs have the form
/// `{base_url}/uploads/{key}?expires={unix_secs}&signature={hex_hmac}` and are
/// verified by [`Storage::transfer`] before any byte is written.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    signing_secret: Vec<u8>,
    upload_url_ttl: Duration,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/campground/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    /// * `signing_secret` - HMAC key for upload URLs; a random key is generated when absent
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        signing_secret: Option<String>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let signing_secret = match signing_secret {
            Some(secret) => secret.into_bytes(),
            None => rand::random::<[u8; 32]>().to_vec(),
        };

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            signing_secret,
            upload_url_ttl: Duration::from_secs(UPLOAD_URL_TTL_SECS),
        })
    }

    pub fn with_upload_url_ttl(mut self, ttl: Duration) -> Self {
        self.upload_url_ttl = ttl;
        self
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        keys::validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    fn upload_prefix(&self) -> String {
        format!("{}/uploads/", self.base_url)
    }

    fn sign(&self, key: &str, expires: i64) -> StorageResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_secret)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        mac.update(format!("{}:{}", key, expires).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check a signed URL against the authorization it was issued with.
    ///
    /// Validates:
    /// 1. The URL targets this storage and the authorized key
    /// 2. The HMAC signature matches the secret
    /// 3. The URL has not expired
    fn verify_signed_url(&self, authorization: &UploadAuthorization) -> StorageResult<()> {
        let rest = authorization
            .signed_url
            .strip_prefix(&self.upload_prefix())
            .ok_or_else(|| {
                StorageError::AuthorizationFailed("Upload URL targets another storage".to_string())
            })?;
        let (key, query) = rest.split_once('?').ok_or_else(|| {
            StorageError::AuthorizationFailed("Upload URL is not signed".to_string())
        })?;

        if key != authorization.path {
            return Err(StorageError::AuthorizationFailed(
                "Upload URL does not match the authorized path".to_string(),
            ));
        }

        let mut expires = None;
        let mut signature = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("expires", v)) => expires = v.parse::<i64>().ok(),
                Some(("signature", v)) => signature = Some(v),
                _ => {}
            }
        }
        let (expires, signature) = match (expires, signature) {
            (Some(e), Some(s)) => (e, s),
            _ => {
                return Err(StorageError::AuthorizationFailed(
                    "Upload URL is missing expires or signature".to_string(),
                ))
            }
        };

        let signature = hex::decode(signature).map_err(|_| {
            StorageError::AuthorizationFailed("Upload URL signature is malformed".to_string())
        })?;
        let mut mac = HmacSha256::new_from_slice(&self.signing_secret)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        mac.update(format!("{}:{}", key, expires).as_bytes());
        mac.verify_slice(&signature).map_err(|_| {
            StorageError::AuthorizationFailed("Upload URL signature mismatch".to_string())
        })?;

        if Utc::now().timestamp() >= expires {
            return Err(StorageError::AuthorizationFailed(
                "Upload URL has expired".to_string(),
            ));
        }

        Ok(())
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write `data` to `path`. A failed write leaves no file behind.
    async fn write_file(
        &self,
        path: &Path,
        data: &Bytes,
        on_progress: Option<&ProgressCallback>,
    ) -> StorageResult<()> {
        self.ensure_parent_dir(path).await?;

        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let result = Self::write_chunks(&mut file, path, data, on_progress).await;
        drop(file);

        if result.is_err() {
            if let Err(e) = fs::remove_file(path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove partially written file"
                );
            }
        }
        result
    }

    async fn write_chunks(
        file: &mut fs::File,
        path: &Path,
        data: &Bytes,
        on_progress: Option<&ProgressCallback>,
    ) -> StorageResult<()> {
        let total = data.len() as u64;
        let mut written = 0u64;
        for chunk in data.chunks(TRANSFER_CHUNK_SIZE) {
            file.write_all(chunk).await.map_err(|e| {
                StorageError::TransferFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += chunk.len() as u64;
            if let Some(cb) = on_progress {
                cb(TransferProgress {
                    bytes_sent: written,
                    total_bytes: total,
                });
            }
        }

        file.sync_all().await.map_err(|e| {
            StorageError::TransferFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn authorize(
        &self,
        campground_id: i64,
        original_filename: &str,
        content_type: &str,
    ) -> StorageResult<UploadAuthorization> {
        let key = keys::authorized_key(campground_id, original_filename, content_type);
        self.key_to_path(&key)?;

        let ttl = chrono::Duration::from_std(self.upload_url_ttl)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        let expires_at: DateTime<Utc> = Utc::now() + ttl;
        let signature = self.sign(&key, expires_at.timestamp())?;

        let signed_url = format!(
            "{}{}?expires={}&signature={}",
            self.upload_prefix(),
            key,
            expires_at.timestamp(),
            signature
        );

        tracing::debug!(
            key = %key,
            campground_id = campground_id,
            expires_at = %expires_at,
            "Local storage upload authorized"
        );

        Ok(UploadAuthorization {
            path: key,
            signed_url,
            expires_at,
        })
    }

    async fn transfer(
        &self,
        authorization: &UploadAuthorization,
        _content_type: &str,
        data: Bytes,
        on_progress: ProgressCallback,
    ) -> StorageResult<()> {
        self.verify_signed_url(authorization)?;
        let path = self.key_to_path(&authorization.path)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        on_progress(TransferProgress::started(size));
        self.write_file(&path, &data, Some(&on_progress)).await?;
        on_progress(TransferProgress::completed(size));

        tracing::info!(
            path = %path.display(),
            key = %authorization.path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage transfer successful"
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
        let path = self.key_to_path(&key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        self.write_file(&path, &data, None).await?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage direct upload successful"
        );

        Ok(key)
    }

    fn public_url(&self, storage_key: &str) -> String {
        self.generate_url(storage_key)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
