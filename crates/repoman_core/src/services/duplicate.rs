//! Duplicate display-name checks.

use crate::error::RepoError;
use crate::models::ConnectionRecord;
use crate::services::LocalStorage;

use async_trait::async_trait;
use std::sync::Arc;

/// Answers whether a repository with the record's display name already exists.
#[async_trait]
pub trait DuplicateChecker: Send + Sync {
    /// Resolve to `true` when the display name is already taken.
    async fn check_duplicate(&self, connection: &ConnectionRecord) -> Result<bool, RepoError>;
}

/// Checks display names against repositories in local storage.
///
/// Names are compared exactly; "Sales" and "sales" are different repositories.
pub struct StorageDuplicateChecker {
    storage: Arc<LocalStorage>,
}

impl StorageDuplicateChecker {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl DuplicateChecker for StorageDuplicateChecker {
    async fn check_duplicate(&self, connection: &ConnectionRecord) -> Result<bool, RepoError> {
        let storage = Arc::clone(&self.storage);
        let name = connection.display_name.clone();

        // SQLite calls block, keep them off the async workers.
        let exists = tokio::task::spawn_blocking(move || storage.display_name_exists(&name))
            .await
            .map_err(|e| RepoError::duplicate_check_with_source("Duplicate check task failed", e))??;

        tracing::debug!(name = %connection.display_name, exists, "Duplicate check completed");
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SavedRepository;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_storage_checker_finds_saved_name() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(LocalStorage::open(dir.path().to_path_buf()).unwrap());
        let existing = ConnectionRecord::new("Sales").with_database("pg");
        storage.save_repository(&SavedRepository::from_record(&existing)).unwrap();

        let checker = StorageDuplicateChecker::new(storage);
        assert!(checker.check_duplicate(&existing).await.unwrap());
        assert!(!checker.check_duplicate(&ConnectionRecord::new("Finance")).await.unwrap());
    }
}
