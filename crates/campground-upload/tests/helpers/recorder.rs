use std::sync::Mutex;

use async_trait::async_trait;
use campground_core::models::ImageRecordRequest;
use campground_core::ImageRecorder;

/// Records every request; optionally fails all of them.
pub struct FakeRecorder {
    requests: Mutex<Vec<ImageRecordRequest>>,
    fail: bool,
}

impl FakeRecorder {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn requests(&self) -> Vec<ImageRecordRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageRecorder for FakeRecorder {
    async fn record(&self, request: &ImageRecordRequest) -> anyhow::Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            anyhow::bail!("metadata endpoint returned 503");
        }
        Ok(())
    }
}
