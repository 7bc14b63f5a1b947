//! Shared key generation for storage backends.
//!
//! Key format: `campgrounds/{campground_id}/{uuid}-{sanitized_name}` for
//! authorized uploads, `{namespace}/{uuid}.{ext}` for direct uploads.
//! The random component makes every call unique even for identical inputs.

use campground_core::constants::{FALLBACK_EXTENSION, STORAGE_SCOPE, TEMP_NAMESPACE};
use uuid::Uuid;

use crate::{StorageError, StorageResult};

const MAX_FILENAME_LEN: usize = 255;
const MAX_EXTENSION_LEN: usize = 8;

/// Reduce a user-supplied filename to `[A-Za-z0-9._-]`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    if base.contains("..") {
        return "invalid_filename".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX_FILENAME_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim().is_empty() || s.len() < 3 {
        "file".to_string()
    } else {
        s
    }
}

/// Fixed MIME type to extension mapping for accepted image types.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/avif" => Some("avif"),
        "image/heic" => Some("heic"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

/// Extension of `filename`, unless it is missing or degenerate.
///
/// Degenerate means there is no dot (the "extension" would be the whole
/// name), the part after the last dot is empty, too long, or not alphanumeric.
fn filename_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Resolve the extension for a stored file: filename first, then MIME type,
/// then [`FALLBACK_EXTENSION`].
pub fn resolve_extension(filename: &str, content_type: &str) -> String {
    filename_extension(filename)
        .or_else(|| extension_for_content_type(content_type).map(String::from))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Namespace for uploads made before the campground exists.
pub fn temp_namespace(user_id: Uuid) -> String {
    format!("{}/{}/{}", STORAGE_SCOPE, TEMP_NAMESPACE, user_id)
}

/// Key for an authorized upload to an existing campground.
pub fn authorized_key(campground_id: i64, original_filename: &str, content_type: &str) -> String {
    let mut name = sanitize_filename(original_filename);
    if filename_extension(&name).is_none() {
        name = format!("{}.{}", name, resolve_extension(original_filename, content_type));
    }
    format!(
        "{}/{}/{}-{}",
        STORAGE_SCOPE,
        campground_id,
        Uuid::new_v4(),
        name
    )
}

/// Key for a direct upload into `namespace`.
pub fn direct_key(
    namespace: &str,
    original_filename: &str,
    content_type: &str,
) -> StorageResult<String> {
    validate_key(namespace)?;
    Ok(format!(
        "{}/{}.{}",
        namespace.trim_end_matches('/'),
        Uuid::new_v4(),
        resolve_extension(original_filename, content_type)
    ))
}

/// Reject keys that could escape the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            key
        )));
    }
    Ok(())
}
