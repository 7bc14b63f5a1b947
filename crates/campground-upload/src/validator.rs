use campground_core::{UploadError, UploadLimits};

/// Image file validator
///
/// Checks a candidate's content type against the whitelist and its size
/// against the configured maximum. Extension checks are left to the storage
/// binding, which resolves the stored extension on its own.
#[derive(Debug, Clone)]
pub struct ImageValidator {
    max_file_size: u64,
    allowed_content_types: Vec<String>,
}

impl ImageValidator {
    pub fn new(max_file_size: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn from_limits(limits: &UploadLimits) -> Self {
        Self::new(
            limits.max_file_size_bytes,
            limits.allowed_content_types.clone(),
        )
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), UploadError> {
        if size == 0 {
            return Err(UploadError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(UploadError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type, ignoring case and any `; charset=...` parameters
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), UploadError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_lowercase();

        if !self.allowed_content_types.iter().any(|ct| ct == &essence) {
            return Err(UploadError::UnsupportedType {
                content_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    /// Type first, then size: a PDF that is also too large reports the type.
    pub fn validate_all(&self, content_type: &str, size: u64) -> Result<(), UploadError> {
        self.validate_content_type(content_type)?;
        self.validate_file_size(size)?;
        Ok(())
    }
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::from_limits(&UploadLimits::default())
    }
}
