use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::models::{Client, ClientStatus};

/// File name of the storage slot holding the whole client collection
pub const STORAGE_KEY: &str = "mini-crm-clients.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read storage slot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write storage slot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage slot {path} holds a corrupt blob: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize client collection: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Durable storage of the full client collection as one JSON blob
/// under a fixed slot inside the data directory.
pub struct ClientStorage {
    path: PathBuf,
}

impl ClientStorage {
    /// Create a storage adapter rooted at the given data directory
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORAGE_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored collection, seeding the slot on first use.
    ///
    /// A corrupt blob is surfaced as an error, never silently replaced.
    pub fn load(&self) -> Result<Vec<Client>, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "storage slot empty, seeding");
            let seed = seed_clients();
            self.save(&seed)?;
            return Ok(seed);
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the slot with the serialized collection. Last write wins;
    /// callers read, mutate and write the entire collection each time.
    pub fn save(&self, clients: &[Client]) -> Result<(), StorageError> {
        let blob = serde_json::to_string_pretty(clients).map_err(StorageError::Serialize)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, blob).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = clients.len(), "collection persisted");
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    // Seed dates are fixed literals, always valid
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn seed_client(
    id: i64,
    name: &str,
    email: &str,
    phone: &str,
    status: ClientStatus,
    created_at: NaiveDate,
) -> Client {
    Client {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        status,
        created_at,
    }
}

/// Fixed collection used to initialize an empty storage slot
pub fn seed_clients() -> Vec<Client> {
    use ClientStatus::{Active, Blocked, New};

    vec![
        seed_client(1, "Иван Петров", "ivan@example.com", "+7 (900) 111-22-33", Active, date(2025, 1, 15)),
        seed_client(2, "Мария Сидорова", "maria@example.com", "+7 (900) 222-33-44", New, date(2025, 2, 20)),
        seed_client(3, "Алексей Козлов", "alexey@example.com", "+7 (900) 333-44-55", Active, date(2025, 3, 10)),
        seed_client(4, "Елена Новикова", "elena@example.com", "+7 (900) 444-55-66", Blocked, date(2025, 4, 5)),
        seed_client(5, "Дмитрий Волков", "dmitry@example.com", "+7 (900) 555-66-77", Active, date(2025, 5, 12)),
        seed_client(6, "Ольга Морозова", "olga@example.com", "+7 (900) 666-77-88", New, date(2025, 6, 18)),
        seed_client(7, "Сергей Лебедев", "sergey@example.com", "+7 (900) 777-88-99", Active, date(2025, 7, 22)),
        seed_client(8, "Наталья Егорова", "natalia@example.com", "+7 (900) 888-99-00", Blocked, date(2025, 8, 30)),
        seed_client(9, "Андрей Соколов", "andrey@example.com", "+7 (900) 999-00-11", New, date(2025, 9, 14)),
        seed_client(10, "Татьяна Попова", "tatiana@example.com", "+7 (900) 100-20-30", Active, date(2025, 10, 1)),
        seed_client(11, "Виктор Михайлов", "victor@example.com", "+7 (900) 200-30-40", New, date(2025, 11, 8)),
        seed_client(12, "Анна Федорова", "anna@example.com", "+7 (900) 300-40-50", Active, date(2025, 12, 25)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_seeds_empty_slot() {
        let dir = tempdir().unwrap();
        let storage = ClientStorage::new(dir.path());

        let clients = storage.load().unwrap();
        assert_eq!(clients, seed_clients());
        assert_eq!(clients.len(), 12);

        // The seed must now be persisted in the slot
        let raw = fs::read_to_string(storage.path()).unwrap();
        let stored: Vec<Client> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, clients);
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempdir().unwrap();
        let storage = ClientStorage::new(dir.path());

        let original = storage.load().unwrap();
        storage.save(&original).unwrap();
        assert_eq!(storage.load().unwrap(), original);
    }

    #[test]
    fn wire_format_matches_original() {
        let dir = tempdir().unwrap();
        let storage = ClientStorage::new(dir.path());
        storage.load().unwrap();

        let raw = fs::read_to_string(storage.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["id"], 1);
        assert_eq!(first["status"], "active");
        assert_eq!(first["createdAt"], "2025-01-15");
    }

    #[test]
    fn corrupt_blob_is_surfaced() {
        let dir = tempdir().unwrap();
        let storage = ClientStorage::new(dir.path());
        fs::write(storage.path(), "{not json").unwrap();

        let err = storage.load().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn empty_collection_persists_as_empty_array() {
        let dir = tempdir().unwrap();
        let storage = ClientStorage::new(dir.path());

        storage.save(&[]).unwrap();
        assert!(storage.load().unwrap().is_empty());
    }
}
