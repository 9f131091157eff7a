use std::time::Duration;

use chrono::{Local, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::models::{Client, ClientFormData};
use crate::storage::{ClientStorage, StorageError};

/// Simulated network latency applied to every operation
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Error)]
pub enum ApiError {
    // Message matches the one shown to users in the original product
    #[error("Клиент не найден")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Stateless async CRUD façade over the storage adapter.
///
/// Storage access is synchronous underneath; the injectable delay simulates
/// network I/O so the store's loading-state contract has observable meaning.
pub struct ClientApi {
    storage: ClientStorage,
    delay: Duration,
}

impl ClientApi {
    pub fn new(storage: ClientStorage) -> Self {
        Self::with_delay(storage, DEFAULT_DELAY)
    }

    /// Tests pass `Duration::ZERO` so they run without waiting on timers
    pub fn with_delay(storage: ClientStorage, delay: Duration) -> Self {
        Self { storage, delay }
    }

    async fn sleep(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Client>, ApiError> {
        self.sleep().await;
        Ok(self.storage.load()?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Client>, ApiError> {
        self.sleep().await;
        let clients = self.storage.load()?;
        Ok(clients.into_iter().find(|c| c.id == id))
    }

    pub async fn create(&self, data: ClientFormData) -> Result<Client, ApiError> {
        self.sleep().await;
        let mut clients = self.storage.load()?;

        let client = Client {
            id: generate_id(&clients),
            name: data.name,
            email: data.email,
            phone: data.phone,
            status: data.status,
            created_at: Local::now().date_naive(),
        };
        debug!(id = client.id, "creating client");

        clients.push(client.clone());
        self.storage.save(&clients)?;
        Ok(client)
    }

    pub async fn update(&self, id: i64, data: ClientFormData) -> Result<Client, ApiError> {
        self.sleep().await;
        let mut clients = self.storage.load()?;

        let existing = clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ApiError::NotFound)?;

        // Full replacement of the mutable fields; id and created_at survive
        existing.name = data.name;
        existing.email = data.email;
        existing.phone = data.phone;
        existing.status = data.status;
        let updated = existing.clone();

        self.storage.save(&clients)?;
        debug!(id, "client updated");
        Ok(updated)
    }

    /// Remove the matching record. Absence is a no-op, not an error.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.sleep().await;
        let mut clients = self.storage.load()?;
        clients.retain(|c| c.id != id);
        self.storage.save(&clients)?;
        debug!(id, "client deleted");
        Ok(())
    }
}

/// Current time in milliseconds plus a small random offset. Collisions are
/// already unlikely; re-drawing on a hit makes the returned id unique.
fn generate_id(existing: &[Client]) -> i64 {
    let mut rng = rand::thread_rng();
    loop {
        let id = Utc::now().timestamp_millis() + rng.gen_range(0..1000);
        if !existing.iter().any(|c| c.id == id) {
            return id;
        }
    }
}
