//! Campground image endpoints.

use crate::ApiClient;
use anyhow::{Context, Result};
use campground_core::models::{AssociatedImage, CampgroundImagesUpdate, ImageRecordRequest};

/// Path of a campground's image collection, relative to the API prefix.
pub fn campground_images_path(campground_id: i64) -> String {
    format!("/campgrounds/{}/images", campground_id)
}

impl ApiClient {
    /// Persist one uploaded image against its campground.
    pub async fn record_campground_image(&self, request: &ImageRecordRequest) -> Result<()> {
        self.post_json_no_content(&campground_images_path(request.campground_id), request)
            .await
            .with_context(|| {
                format!(
                    "Failed to record image {} for campground {}",
                    request.path, request.campground_id
                )
            })
    }

    /// Load the persisted image list of a campground.
    pub async fn list_campground_images(&self, campground_id: i64) -> Result<Vec<AssociatedImage>> {
        self.get(&campground_images_path(campground_id))
            .await
            .with_context(|| format!("Failed to load images of campground {}", campground_id))
    }

    /// Replace a campground's image list with the given ordered URLs.
    pub async fn update_campground_images(
        &self,
        campground_id: i64,
        update: &CampgroundImagesUpdate,
    ) -> Result<Vec<AssociatedImage>> {
        self.put_json(&campground_images_path(campground_id), update)
            .await
            .with_context(|| format!("Failed to update images of campground {}", campground_id))
    }
}
