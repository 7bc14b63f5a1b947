//! Configuration module
//!
//! Upload limits, storage backend settings, and API client settings. Every
//! limit has a fixed default in [`crate::constants`]; the environment may
//! override it.

use std::env;
use std::time::Duration;

use uuid::Uuid;

use crate::constants::{ALLOWED_CONTENT_TYPES, MAX_FILE_SIZE_MB, MAX_IMAGES, UPLOAD_URL_TTL_SECS};
use crate::models::RecordingMode;
use crate::storage_types::StorageBackend;

/// Limits enforced at intake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_images: usize,
    pub max_file_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub upload_url_ttl_secs: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_images: MAX_IMAGES,
            max_file_size_bytes: (MAX_FILE_SIZE_MB * 1024 * 1024) as u64,
            allowed_content_types: ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            upload_url_ttl_secs: UPLOAD_URL_TTL_SECS,
        }
    }
}

impl UploadLimits {
    pub fn upload_url_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_url_ttl_secs)
    }
}

/// Storage backend configuration
#[derive(Clone, Debug, Default)]
pub struct StorageConfig {
    pub backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, Supabase, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_signing_secret: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub limits: UploadLimits,
    pub storage: StorageConfig,
    pub recording_mode: RecordingMode,
    pub api_url: String,
    pub api_key: Option<String>,
    /// Signed-in user for CLI sessions.
    pub user_id: Option<Uuid>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = UploadLimits::default();

        let max_file_size_bytes = var("MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<u64>().ok())
            .map(|mb| {
                mb.checked_mul(1024 * 1024)
                    .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", mb))
            })
            .transpose()?
            .unwrap_or(defaults.max_file_size_bytes);

        let allowed_content_types = var("ALLOWED_CONTENT_TYPES")
            .map(|s| {
                s.split(',')
                    .map(|ct| ct.trim().to_lowercase())
                    .filter(|ct| !ct.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_content_types);

        let storage_backend = var("STORAGE_BACKEND")
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?;

        let recording_mode = var("RECORDING_MODE")
            .map(|s| s.parse::<RecordingMode>())
            .transpose()?
            .unwrap_or_default();

        let user_id = var("CAMPGROUND_USER_ID")
            .filter(|s| !s.is_empty())
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| anyhow::anyhow!("CAMPGROUND_USER_ID must be a UUID: {}", e))?;

        let config = Config {
            environment: var("ENVIRONMENT")
                .or_else(|| var("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            limits: UploadLimits {
                max_images: var("MAX_IMAGES")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.max_images),
                max_file_size_bytes,
                allowed_content_types,
                upload_url_ttl_secs: var("UPLOAD_URL_TTL_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.upload_url_ttl_secs),
            },
            storage: StorageConfig {
                backend: storage_backend,
                s3_bucket: var("S3_BUCKET"),
                s3_region: var("S3_REGION"),
                s3_endpoint: var("S3_ENDPOINT"),
                aws_region: var("AWS_REGION"),
                local_storage_path: var("LOCAL_STORAGE_PATH"),
                local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
                local_signing_secret: var("LOCAL_STORAGE_SIGNING_SECRET")
                    .filter(|s| !s.is_empty()),
            },
            recording_mode,
            api_url: var("CAMPGROUND_API_URL")
                .or_else(|| var("API_URL"))
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            api_key: var("CAMPGROUND_API_KEY").filter(|s| !s.is_empty()),
            user_id,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.storage.backend
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.limits.max_images == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGES must be at least 1"));
        }

        if self.limits.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be at least 1"));
        }

        if self.limits.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must list at least one MIME type"
            ));
        }

        if self.limits.upload_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_URL_TTL_SECS must be positive"));
        }

        let backend = self.storage.backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() && self.storage.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                if self.is_production() && self.storage.local_signing_secret.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_SIGNING_SECRET must be set in production"
                    ));
                }
            }
        }

        Ok(())
    }
}
