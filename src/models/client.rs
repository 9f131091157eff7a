use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a client record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    New,
    Active,
    Blocked,
}

impl ClientStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ClientStatus::New => "new",
            ClientStatus::Active => "active",
            ClientStatus::Blocked => "blocked",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ClientStatus::New => ClientStatus::Active,
            ClientStatus::Active => ClientStatus::Blocked,
            ClientStatus::Blocked => ClientStatus::New,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            ClientStatus::New => ClientStatus::Blocked,
            ClientStatus::Active => ClientStatus::New,
            ClientStatus::Blocked => ClientStatus::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: ClientStatus,
    // Set once at creation, immutable afterwards
    #[serde(rename = "createdAt")]
    pub created_at: NaiveDate,
}

/// The mutable subset of a Client, used as create/update input
#[derive(Debug, Clone, PartialEq)]
pub struct ClientFormData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: ClientStatus,
}

impl ClientFormData {
    pub fn from_client(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            status: client.status,
        }
    }
}
