use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use campground_core::models::UploadAuthorization;
use campground_storage::{
    keys, ProgressCallback, Storage, StorageBackend, StorageError, StorageResult,
    TransferProgress,
};
use chrono::{Duration, Utc};
use tokio::sync::Notify;

pub const PUBLIC_BASE_URL: &str = "https://cdn.test";

/// In-memory storage that records calls and can hold or fail chosen files.
///
/// Files are addressed by their original filename.
#[derive(Default)]
pub struct FakeStorage {
    authorize_calls: Mutex<Vec<(i64, String)>>,
    direct_calls: Mutex<Vec<(String, String)>>,
    /// Filenames in the order their transfers finished
    completed: Mutex<Vec<String>>,
    /// storage path -> original filename
    paths: Mutex<HashMap<String, String>>,
    objects: Mutex<HashMap<String, Bytes>>,
    fail_transfer: Mutex<HashSet<String>>,
    fail_authorize: Mutex<HashSet<String>>,
    /// filename -> gate its transfer waits on
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    /// filename -> gate opened when its transfer finishes
    openers: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_transfer_of(&self, filename: &str) {
        self.fail_transfer
            .lock()
            .unwrap()
            .insert(filename.to_string());
    }

    pub fn fail_authorize_of(&self, filename: &str) {
        self.fail_authorize
            .lock()
            .unwrap()
            .insert(filename.to_string());
    }

    /// Hold `held` until `other` has finished transferring.
    pub fn hold_until_done(&self, held: &str, other: &str) {
        let gate = self.hold(held);
        self.openers.lock().unwrap().insert(other.to_string(), gate);
    }

    /// Hold `held` until the returned gate is notified.
    pub fn hold(&self, held: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(held.to_string(), gate.clone());
        gate
    }

    pub fn authorize_calls(&self) -> Vec<(i64, String)> {
        self.authorize_calls.lock().unwrap().clone()
    }

    pub fn direct_calls(&self) -> Vec<(String, String)> {
        self.direct_calls.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    pub fn object(&self, path: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(path).cloned()
    }

    fn filename_for(&self, path: &str) -> String {
        self.paths
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    async fn wait_for_gate(&self, filename: &str) {
        let gate = self.gates.lock().unwrap().get(filename).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn finish(&self, filename: &str, path: &str, data: Bytes) {
        self.objects.lock().unwrap().insert(path.to_string(), data);
        self.completed.lock().unwrap().push(filename.to_string());
        if let Some(opener) = self.openers.lock().unwrap().get(filename) {
            opener.notify_one();
        }
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn authorize(
        &self,
        campground_id: i64,
        original_filename: &str,
        content_type: &str,
    ) -> StorageResult<UploadAuthorization> {
        self.authorize_calls
            .lock()
            .unwrap()
            .push((campground_id, original_filename.to_string()));

        if self.fail_authorize.lock().unwrap().contains(original_filename) {
            return Err(StorageError::AuthorizationFailed(
                "signing service unavailable".to_string(),
            ));
        }

        let path = keys::authorized_key(campground_id, original_filename, content_type);
        self.paths
            .lock()
            .unwrap()
            .insert(path.clone(), original_filename.to_string());

        Ok(UploadAuthorization {
            signed_url: format!("https://upload.test/{}?sig=fake", path),
            path,
            expires_at: Utc::now() + Duration::minutes(10),
        })
    }

    async fn transfer(
        &self,
        authorization: &UploadAuthorization,
        _content_type: &str,
        data: Bytes,
        on_progress: ProgressCallback,
    ) -> StorageResult<()> {
        let filename = self.filename_for(&authorization.path);
        let total = data.len() as u64;

        on_progress(TransferProgress::started(total));
        self.wait_for_gate(&filename).await;
        on_progress(TransferProgress {
            bytes_sent: total / 2,
            total_bytes: total,
        });
        tokio::task::yield_now().await;

        if self.fail_transfer.lock().unwrap().contains(&filename) {
            return Err(StorageError::Rejected {
                status: 403,
                message: "SignatureDoesNotMatch".to_string(),
            });
        }

        on_progress(TransferProgress::completed(total));
        tokio::task::yield_now().await;
        self.finish(&filename, &authorization.path, data);
        Ok(())
    }

    async fn upload_direct(
        &self,
        namespace: &str,
        original_filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        self.direct_calls
            .lock()
            .unwrap()
            .push((namespace.to_string(), original_filename.to_string()));
        self.wait_for_gate(original_filename).await;

        if self.fail_transfer.lock().unwrap().contains(original_filename) {
            return Err(StorageError::UploadFailed("connection reset".to_string()));
        }

        let path = keys::direct_key(namespace, original_filename, content_type)?;
        self.finish(original_filename, &path, data);
        Ok(path)
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", PUBLIC_BASE_URL, storage_key)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects
            .lock()
            .unwrap()
            .remove(storage_key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
