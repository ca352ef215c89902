//! Application state management.
//!
//! Owns the services the details form talks to and hands out controllers
//! wired to them.

use crate::config::AppConfig;
use crate::details::{DetailsController, ErrorCallback};
use crate::error::RepoError;
use crate::models::{ConnectionRecord, SavedRepository};
use crate::services::{
    DuplicateChecker, LocalStorage, MessageBundle, StateRouter, StorageDuplicateChecker,
};

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Central application state.
pub struct RepoState {
    config: AppConfig,
    storage: Arc<LocalStorage>,
    messages: Arc<MessageBundle>,
    router: Arc<StateRouter>,
    checker: Arc<dyn DuplicateChecker>,
    /// Tokio runtime for async service calls
    tokio_runtime: tokio::runtime::Runtime,
}

impl RepoState {
    /// Create application state from configuration.
    pub fn new(config: AppConfig) -> Result<Self, RepoError> {
        crate::services::storage::init_data_dir(&config.data_dir)?;

        let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| RepoError::internal(format!("Failed to create tokio runtime: {e}")))?;

        let storage = Arc::new(LocalStorage::open(config.data_dir.clone())?);
        let messages = Arc::new(load_messages(config.messages_path.as_deref())?);
        let checker = Arc::new(StorageDuplicateChecker::new(Arc::clone(&storage)));

        tracing::info!(data_dir = %config.data_dir.display(), "RepoState initialized");

        Ok(Self {
            config,
            storage,
            messages,
            router: Arc::new(StateRouter::new()),
            checker,
            tokio_runtime,
        })
    }

    /// Build an initialized details form for `record`.
    pub fn details_controller<'a>(
        &self,
        record: &'a mut ConnectionRecord,
        on_error: ErrorCallback<'a>,
    ) -> DetailsController<'a> {
        let mut controller = DetailsController::new(
            record,
            self.messages.clone(),
            Arc::clone(&self.checker),
            self.router.clone(),
            on_error,
        )
        .with_check_timeout(self.config.check_timeout);
        controller.initialize();
        controller
    }

    /// Persist a finished form; this is the work of the loading state.
    ///
    /// `existing` names the repository being edited and is required when the
    /// record is an edit, since the display name itself may have changed.
    pub fn complete_loading(
        &self,
        record: &ConnectionRecord,
        existing: Option<Uuid>,
    ) -> Result<SavedRepository, RepoError> {
        let previous = match existing {
            Some(id) => self.storage.load_repository(id)?,
            None if record.is_existing() => {
                return Err(RepoError::internal(format!(
                    "Edited repository '{}' was submitted without its id",
                    record.display_name
                )));
            }
            None => None,
        };

        let repository = match previous {
            Some(previous) => SavedRepository {
                display_name: record.display_name.clone(),
                database_connection: record.database_connection.clone(),
                description: record.description.clone(),
                is_default: record.is_default,
                updated_at: Utc::now(),
                ..previous
            },
            None => SavedRepository::from_record(record),
        };

        self.storage.save_repository(&repository)?;
        tracing::info!(
            repository_id = %repository.id,
            name = %repository.display_name,
            "Repository saved"
        );
        Ok(repository)
    }

    // ========== Service Accessors ==========

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn messages(&self) -> &MessageBundle {
        &self.messages
    }

    pub fn router(&self) -> &StateRouter {
        &self.router
    }

    /// Block on a future using the tokio runtime.
    ///
    /// Must not be called from inside the runtime.
    pub fn block_on<F, T>(&self, future: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        self.tokio_runtime.block_on(future)
    }
}

fn load_messages(path: Option<&Path>) -> Result<MessageBundle, RepoError> {
    match path {
        Some(path) => MessageBundle::load_overlay(path),
        None => Ok(MessageBundle::english()),
    }
}
