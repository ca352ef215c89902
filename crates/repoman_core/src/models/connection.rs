//! The connection record edited by the details form.

use serde::{Deserialize, Serialize};

/// Value of `database_connection` before a database has been chosen.
pub const NO_DATABASE: &str = "None";

fn no_database() -> String {
    NO_DATABASE.to_string()
}

/// A database repository connection as edited by the details form.
///
/// Owned by the hosting screen. The details controller borrows it mutably
/// and only changes fields in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    /// User-entered name, required to finish.
    #[serde(default)]
    pub display_name: String,
    /// Chosen database connection, [`NO_DATABASE`] until one is picked.
    #[serde(default = "no_database")]
    pub database_connection: String,
    /// Whether this repository is launched by default.
    #[serde(default)]
    pub is_default: bool,
    /// Editing an existing repository.
    #[serde(default)]
    pub edit: bool,
    /// Modifying a repository in place.
    #[serde(default)]
    pub modify: bool,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl Default for ConnectionRecord {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            database_connection: no_database(),
            is_default: false,
            edit: false,
            modify: false,
            description: String::new(),
        }
    }
}

impl ConnectionRecord {
    /// Create a new record for a repository that does not exist yet.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self { display_name: display_name.into(), ..Self::default() }
    }

    /// Set the database connection.
    pub fn with_database(mut self, database_connection: impl Into<String>) -> Self {
        self.database_connection = database_connection.into();
        self
    }

    /// Mark the record as an edit of an existing repository.
    pub fn editing(mut self) -> Self {
        self.edit = true;
        self
    }

    /// Mark the record as an in-place modification.
    pub fn modifying(mut self) -> Self {
        self.modify = true;
        self
    }

    /// Check whether a database connection has been chosen.
    pub fn has_database(&self) -> bool {
        self.database_connection != NO_DATABASE
    }

    /// Check whether every field required to finish is filled in.
    pub fn is_complete(&self) -> bool {
        !self.display_name.is_empty() && self.has_database()
    }

    /// Check whether this record refers to a repository that already exists.
    pub fn is_existing(&self) -> bool {
        self.edit || self.modify
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_database() {
        let record = ConnectionRecord::default();
        assert_eq!(record.database_connection, NO_DATABASE);
        assert!(!record.has_database());
        assert!(!record.is_complete());
    }

    #[test]
    fn test_is_complete_requires_both_fields() {
        assert!(!ConnectionRecord::new("").with_database("h2").is_complete());
        assert!(!ConnectionRecord::new("Repo").is_complete());
        assert!(ConnectionRecord::new("Repo").with_database("h2").is_complete());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"displayName":"Sales","databaseConnection":"pg","isDefault":true,"edit":true}"#;
        let record: ConnectionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.display_name, "Sales");
        assert_eq!(record.database_connection, "pg");
        assert!(record.is_default);
        assert!(record.edit);
        assert!(!record.modify);
    }

    #[test]
    fn test_deserialize_missing_database_uses_sentinel() {
        let record: ConnectionRecord = serde_json::from_str(r#"{"displayName":"Sales"}"#).unwrap();
        assert_eq!(record.database_connection, NO_DATABASE);
        assert!(!record.is_complete());
    }
}
