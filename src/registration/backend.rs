//! Persistence backend for registrations and their photos

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::registration::error::BackendError;
use crate::registration::photo::PhotoUpload;
use crate::registration::submission::{NewRegistration, RegistrationRecord};

#[async_trait]
pub trait RegistrationBackend: Send + Sync {
    /// Stores the photo and returns the URL the record should reference.
    async fn upload_photo(&self, photo: &PhotoUpload) -> Result<String, BackendError>;

    async fn create_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<RegistrationRecord, BackendError>;

    /// All registrations, ordered by full name ascending.
    async fn list_registrations(&self) -> Result<Vec<RegistrationRecord>, BackendError>;
}

/// Object name for a stored photo: `{timestamp}-{uuid}.{ext}`.
pub fn photo_object_name(photo: &PhotoUpload) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    format!("{}-{}.{}", timestamp, Uuid::new_v4(), photo.extension())
}

/// In-process backend. Optionally delays every call and can be switched to
/// fail, which is how the registration flow is exercised without a network.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<Vec<RegistrationRecord>>,
    photos: RwLock<Vec<(String, PhotoUpload)>>,
    latency: Duration,
    failing: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn photo_count(&self) -> usize {
        self.photos.read().await.len()
    }

    async fn simulate_call(&self, operation: &str) -> Result<(), BackendError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(format!(
                "memory backend refused {}",
                operation
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RegistrationBackend for MemoryBackend {
    async fn upload_photo(&self, photo: &PhotoUpload) -> Result<String, BackendError> {
        self.simulate_call("photo upload").await?;

        let name = photo_object_name(photo);
        let url = format!("memory://photos/{}", name);
        self.photos.write().await.push((name, photo.clone()));
        Ok(url)
    }

    async fn create_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<RegistrationRecord, BackendError> {
        self.simulate_call("insert").await?;

        let record = RegistrationRecord::new(registration);
        self.records.write().await.push(record.clone());
        info!("Stored registration '{}' ({})", record.full_name, record.id);
        Ok(record)
    }

    async fn list_registrations(&self) -> Result<Vec<RegistrationRecord>, BackendError> {
        self.simulate_call("list").await?;

        let mut records = self.records.read().await.clone();
        records.sort_by_cached_key(|record| record.full_name.to_lowercase());
        Ok(records)
    }
}
