use tracing::warn;

use crate::api::{ApiError, ClientApi};
use crate::models::{Client, ClientFormData};

/// In-memory cache of the client collection plus request-status flags,
/// consumed by the UI. The persisted collection stays the source of truth;
/// this list is rebuilt on fetch and patched on each successful mutation.
pub struct ClientStore {
    api: ClientApi,
    clients: Vec<Client>,
    loading: bool,
    error: Option<String>,
}

impl ClientStore {
    pub fn new(api: ClientApi) -> Self {
        Self {
            api,
            clients: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the cached list with the persisted collection.
    ///
    /// Unlike the mutators this swallows failures: the message lands in
    /// `error` for display and the previous list is kept. The loading flag
    /// is cleared on every exit path.
    pub async fn fetch_clients(&mut self) {
        self.loading = true;
        self.error = None;

        match self.api.fetch_all().await {
            Ok(clients) => self.clients = clients,
            Err(e) => {
                warn!(error = %e, "loading clients failed");
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    pub async fn create_client(&mut self, data: ClientFormData) -> Result<Client, ApiError> {
        self.error = None;

        match self.api.create(data).await {
            Ok(created) => {
                self.clients.push(created.clone());
                Ok(created)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn update_client(
        &mut self,
        id: i64,
        data: ClientFormData,
    ) -> Result<Client, ApiError> {
        self.error = None;

        match self.api.update(id, data).await {
            Ok(updated) => {
                // A miss here means the cache is stale; nothing to patch
                if let Some(cached) = self.clients.iter_mut().find(|c| c.id == id) {
                    *cached = updated.clone();
                }
                Ok(updated)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn delete_client(&mut self, id: i64) -> Result<(), ApiError> {
        self.error = None;

        match self.api.delete(id).await {
            Ok(()) => {
                self.clients.retain(|c| c.id != id);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientStatus;
    use crate::storage::{ClientStorage, STORAGE_KEY, seed_clients};
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    fn test_store() -> (TempDir, ClientStore) {
        let dir = tempdir().unwrap();
        let api = ClientApi::with_delay(ClientStorage::new(dir.path()), Duration::ZERO);
        (dir, ClientStore::new(api))
    }

    fn form(name: &str) -> ClientFormData {
        ClientFormData {
            name: name.to_string(),
            email: "a@x.com".to_string(),
            phone: "1".to_string(),
            status: ClientStatus::New,
        }
    }

    #[tokio::test]
    async fn fetch_replaces_list_and_clears_loading() {
        let (_dir, mut store) = test_store();
        assert!(store.clients().is_empty());

        store.fetch_clients().await;
        assert_eq!(store.clients(), seed_clients());
        assert!(!store.loading());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn fetch_failure_is_swallowed_and_keeps_previous_list() {
        let (dir, mut store) = test_store();
        store.fetch_clients().await;
        let before = store.clients().to_vec();

        std::fs::write(dir.path().join(STORAGE_KEY), "{broken").unwrap();
        store.fetch_clients().await;

        assert!(store.error().is_some());
        assert!(!store.loading());
        assert_eq!(store.clients(), before);
    }

    #[tokio::test]
    async fn create_appends_to_cache() {
        let (_dir, mut store) = test_store();
        store.fetch_clients().await;

        let created = store.create_client(form("A")).await.unwrap();
        assert_eq!(store.clients().len(), 13);
        assert_eq!(store.clients().last(), Some(&created));
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn update_patches_cached_record_in_place() {
        let (_dir, mut store) = test_store();
        store.fetch_clients().await;
        let id = store.clients()[2].id;

        let updated = store.update_client(id, form("Переименован")).await.unwrap();
        assert_eq!(store.clients()[2], updated);
        assert_eq!(store.clients()[2].name, "Переименован");
        assert_eq!(store.clients().len(), 12);
    }

    #[tokio::test]
    async fn update_missing_id_records_error_and_propagates() {
        let (_dir, mut store) = test_store();
        store.fetch_clients().await;
        let before = store.clients().to_vec();

        let err = store.update_client(999, form("X")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(store.error(), Some("Клиент не найден"));
        assert_eq!(store.clients(), before);
    }

    #[tokio::test]
    async fn delete_removes_from_cache() {
        let (_dir, mut store) = test_store();
        store.fetch_clients().await;

        store.delete_client(4).await.unwrap();
        assert_eq!(store.clients().len(), 11);
        assert!(store.clients().iter().all(|c| c.id != 4));
    }

    #[tokio::test]
    async fn mutation_clears_stale_error() {
        let (_dir, mut store) = test_store();
        store.fetch_clients().await;

        store.update_client(999, form("X")).await.unwrap_err();
        assert!(store.error().is_some());

        store.delete_client(1).await.unwrap();
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn concurrent_creates_both_land() {
        // Single-threaded runtime serializes each read-modify-write section,
        // so neither create overwrites the other.
        let dir = tempdir().unwrap();
        let api = ClientApi::with_delay(ClientStorage::new(dir.path()), Duration::ZERO);
        api.fetch_all().await.unwrap();

        let (a, b) = tokio::join!(api.create(form("A")), api.create(form("B")));
        let a = a.unwrap();
        let b = b.unwrap();
        assert_ne!(a.id, b.id);

        let all = api.fetch_all().await.unwrap();
        assert_eq!(all.len(), 14);
        assert!(all.iter().any(|c| c.id == a.id));
        assert!(all.iter().any(|c| c.id == b.id));
    }
}
