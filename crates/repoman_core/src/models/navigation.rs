//! Navigation targets reachable from the details form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of repository a form belongs to, carried by the `other` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepositoryType {
    /// Repository stored in a relational database.
    #[default]
    KettleDatabaseRepository,
    /// Repository stored on the file system.
    KettleFileRepository,
}

impl RepositoryType {
    /// Convert to the string used in state parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KettleDatabaseRepository => "KettleDatabaseRepository",
            Self::KettleFileRepository => "KettleFileRepository",
        }
    }
}

/// A state the router can transition to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// Creates or updates the repository.
    DatabaseLoading,
    /// Picks a database connection.
    DatabaseSelect,
    /// The repository manager list.
    Manager,
    /// The "other repositories" screen for a repository type.
    Other {
        /// Type of repository the user came from.
        repository_type: RepositoryType,
    },
}

impl NavigationTarget {
    /// State name understood by the router.
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::DatabaseLoading => "database.loading",
            Self::DatabaseSelect => "database.select",
            Self::Manager => "manager",
            Self::Other { .. } => "other",
        }
    }

    /// State parameters, if the state takes any.
    pub fn params(&self) -> Option<Value> {
        match self {
            Self::Other { repository_type } => {
                let mut params = Map::new();
                params.insert("type".to_string(), Value::from(repository_type.as_str()));
                Some(Value::Object(params))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.params() {
            Some(params) => write!(f, "{} {}", self.state_name(), params),
            None => f.write_str(self.state_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_other_carries_repository_type() {
        let target = NavigationTarget::Other { repository_type: RepositoryType::default() };
        assert_eq!(target.state_name(), "other");
        assert_eq!(target.params(), Some(json!({ "type": "KettleDatabaseRepository" })));
    }

    #[test]
    fn test_display() {
        assert_eq!(NavigationTarget::DatabaseLoading.to_string(), "database.loading");
        assert_eq!(
            NavigationTarget::Other { repository_type: RepositoryType::KettleDatabaseRepository }
                .to_string(),
            r#"other {"type":"KettleDatabaseRepository"}"#
        );
    }
}
