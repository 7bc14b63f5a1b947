//! Fixed defaults for the upload pipeline.
//!
//! Every value here can be overridden through the environment, see
//! [`Config::from_env`](crate::Config::from_env).

/// Maximum number of images a campground may carry.
pub const MAX_IMAGES: usize = 10;

/// Maximum size of one image in megabytes.
pub const MAX_FILE_SIZE_MB: usize = 10;

/// MIME types accepted at intake.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/avif",
];

/// Lifetime of a signed upload URL.
pub const UPLOAD_URL_TTL_SECS: u64 = 600;

/// Root prefix for every campground image key.
pub const STORAGE_SCOPE: &str = "campgrounds";

/// Namespace under [`STORAGE_SCOPE`] for campgrounds that do not exist yet.
pub const TEMP_NAMESPACE: &str = "temp";

/// Extension used when neither the filename nor the MIME type yields one.
pub const FALLBACK_EXTENSION: &str = "jpg";

/// Chunk size used when streaming bytes so progress can be reported.
pub const TRANSFER_CHUNK_SIZE: usize = 64 * 1024;

/// API version prefix for the campground HTTP API.
pub const API_PREFIX: &str = "/api/v0";
