//! Localized label lookup.
//!
//! The form only needs `key -> string`. [`MessageBundle`] ships English
//! defaults for every key the form uses and can be overlaid from a JSON
//! object of `{ "key": "text" }` pairs.

use crate::error::RepoError;

use std::collections::HashMap;
use std::path::Path;

/// Message keys used by the details form.
pub mod keys {
    pub const CONNECTION_DETAILS: &str = "repositories.connectiondetails.label";
    pub const DISPLAY_NAME: &str = "repositories.displayName.label";
    pub const DATABASE_CONNECTION: &str = "repositories.database.connection.label";
    pub const DESCRIPTION: &str = "repositories.description.label";
    pub const LAUNCH: &str = "repositories.launch.label";
    pub const FINISH: &str = "repositories.finish.label";
    pub const BACK: &str = "repositories.back.label";
    pub const ERROR_EXISTS: &str = "repositories.error.exists.label";
    pub const ERROR_CHECK: &str = "repositories.error.check.label";
}

const ENGLISH: &[(&str, &str)] = &[
    (keys::CONNECTION_DETAILS, "Connection Details"),
    (keys::DISPLAY_NAME, "Display Name"),
    (keys::DATABASE_CONNECTION, "Database Connection"),
    (keys::DESCRIPTION, "Description"),
    (keys::LAUNCH, "Launch connection on startup"),
    (keys::FINISH, "Finish"),
    (keys::BACK, "Back"),
    (keys::ERROR_EXISTS, "A repository with that name already exists."),
    (keys::ERROR_CHECK, "Unable to verify the repository name. Please try again."),
];

/// Provides display strings by key.
pub trait Localizer: Send + Sync {
    /// Get the display string for a key.
    ///
    /// Missing keys are the provider's concern; callers always get a string.
    fn get(&self, key: &str) -> String;
}

/// In-memory message bundle.
#[derive(Debug, Clone, Default)]
pub struct MessageBundle {
    messages: HashMap<String, String>,
}

impl MessageBundle {
    /// Create an empty bundle. Every lookup returns the key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bundle with the English defaults.
    pub fn english() -> Self {
        let messages = ENGLISH.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Self { messages }
    }

    /// Parse a bundle from a JSON object of string values.
    pub fn from_json_str(json: &str) -> Result<Self, RepoError> {
        let messages: HashMap<String, String> = serde_json::from_str(json).map_err(|e| {
            RepoError::config(format!("Message bundle must be a JSON object of strings: {e}"))
        })?;
        Ok(Self { messages })
    }

    /// Load English defaults overlaid with the messages in `path`.
    pub fn load_overlay(path: &Path) -> Result<Self, RepoError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RepoError::config(format!("Failed to read messages '{}': {e}", path.display()))
        })?;
        let overlay = Self::from_json_str(&contents)?;

        let mut bundle = Self::english();
        bundle.merge(overlay);
        tracing::debug!(path = %path.display(), count = bundle.len(), "Message bundle loaded");
        Ok(bundle)
    }

    /// Merge another bundle into this one; its messages win.
    pub fn merge(&mut self, other: MessageBundle) {
        self.messages.extend(other.messages);
    }

    /// Number of messages in the bundle.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Localizer for MessageBundle {
    fn get(&self, key: &str) -> String {
        match self.messages.get(key) {
            Some(value) => value.clone(),
            None => {
                tracing::trace!(key = key, "Message key not found");
                key.to_string()
            }
        }
    }
}
