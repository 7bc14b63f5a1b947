use serde::{Deserialize, Serialize};
use validator::Validate;

/// A committed image reference belonging to one campground.
///
/// `storage_path` is the identity: a campground never holds two entries with
/// the same path. `sort_order` records the position at insertion time; gaps
/// left by removals are not resequenced, so display order is the list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedImage {
    pub url: String,
    pub storage_path: String,
    pub sort_order: usize,
}

/// Request to persist one uploaded image against an existing campground
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ImageRecordRequest {
    #[validate(range(min = 1, message = "Campground id must be positive"))]
    pub campground_id: i64,
    /// Storage key returned by the upload
    #[validate(length(
        min = 1,
        max = 1024,
        message = "Path must be between 1 and 1024 characters"
    ))]
    pub path: String,
    /// Alternative text, defaults to the original filename
    #[validate(length(max = 255, message = "Alt text must be at most 255 characters"))]
    pub alt: Option<String>,
}

/// Ordered image list submitted by the campground create/update layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampgroundImagesUpdate {
    pub image_urls: Vec<String>,
}

impl CampgroundImagesUpdate {
    pub fn from_images(images: &[AssociatedImage]) -> Self {
        Self {
            image_urls: images.iter().map(|image| image.url.clone()).collect(),
        }
    }
}
