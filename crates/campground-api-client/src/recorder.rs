use anyhow::Context;
use async_trait::async_trait;
use campground_core::models::ImageRecordRequest;
use campground_core::ImageRecorder;
use validator::Validate;

use crate::ApiClient;

/// Records uploads through `POST /campgrounds/{id}/images`.
pub struct HttpImageRecorder {
    client: ApiClient,
}

impl HttpImageRecorder {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageRecorder for HttpImageRecorder {
    async fn record(&self, request: &ImageRecordRequest) -> anyhow::Result<()> {
        request
            .validate()
            .context("Invalid image record request")?;

        let start = std::time::Instant::now();
        self.client.record_campground_image(request).await?;

        tracing::debug!(
            campground_id = request.campground_id,
            path = %request.path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Auth;

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_sending() {
        // Nothing listens on port 9; a sent request would fail differently.
        let client = ApiClient::new("http://127.0.0.1:9".to_string(), Auth::Anonymous).unwrap();
        let recorder = HttpImageRecorder::new(client);

        let err = recorder
            .record(&ImageRecordRequest {
                campground_id: 0,
                path: "campgrounds/0/a.jpg".to_string(),
                alt: None,
            })
            .await
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Invalid image record request"), "{}", message);
        assert!(message.contains("campground_id"), "{}", message);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_context() {
        let client = ApiClient::new("http://127.0.0.1:9".to_string(), Auth::Anonymous).unwrap();
        let recorder = HttpImageRecorder::new(client);

        let err = recorder
            .record(&ImageRecordRequest {
                campground_id: 42,
                path: "campgrounds/42/a-photo.jpg".to_string(),
                alt: Some("photo.jpg".to_string()),
            })
            .await
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to record image"), "{}", message);
    }
}
