//! Repositories persisted in local storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ConnectionRecord;

/// A database repository saved by the loading step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRepository {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, unique among saved repositories
    pub display_name: String,
    /// Database connection backing the repository
    pub database_connection: String,
    /// Description shown in the manager
    pub description: String,
    /// Launched by default
    pub is_default: bool,
    /// When the repository was first saved
    pub created_at: DateTime<Utc>,
    /// When the repository was last saved
    pub updated_at: DateTime<Utc>,
}

impl SavedRepository {
    /// Create a new saved repository from a finished form.
    pub fn from_record(record: &ConnectionRecord) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            display_name: record.display_name.clone(),
            database_connection: record.database_connection.clone(),
            description: record.description.clone(),
            is_default: record.is_default,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a record for editing this repository.
    pub fn to_record(&self) -> ConnectionRecord {
        ConnectionRecord {
            display_name: self.display_name.clone(),
            database_connection: self.database_connection.clone(),
            is_default: self.is_default,
            edit: true,
            modify: false,
            description: self.description.clone(),
        }
    }
}
