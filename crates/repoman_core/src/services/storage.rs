//! Local SQLite storage for saved repositories.
//!
//! # Data Directory Locations
//!
//! - **macOS**: `~/Library/Application Support/dev.repoman.Repoman`
//! - **Windows**: `%APPDATA%\repoman\Repoman`
//! - **Linux**: `~/.local/share/repoman`
//! - **Debug builds**: `./repoman_data` in current directory

use crate::error::RepoError;
use crate::models::SavedRepository;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Get the default data directory for the application.
pub fn default_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from("./repoman_data")
    }

    #[cfg(not(debug_assertions))]
    {
        dirs::data_dir()
            .map(|d| {
                #[cfg(target_os = "macos")]
                {
                    d.join("dev.repoman.Repoman")
                }
                #[cfg(target_os = "windows")]
                {
                    d.join("repoman").join("Repoman")
                }
                #[cfg(not(any(target_os = "macos", target_os = "windows")))]
                {
                    d.join("repoman")
                }
            })
            .unwrap_or_else(|| PathBuf::from("./repoman_data"))
    }
}

/// Create the data directory if it does not exist.
pub fn init_data_dir(path: &Path) -> Result<(), RepoError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(RepoError::storage(
                format!("Data path exists but is not a directory: {}", path.display()),
                Some("Select a different location or remove the existing file"),
            ));
        }
        return Ok(());
    }

    std::fs::create_dir_all(path).map_err(|e| {
        RepoError::storage(
            format!("Failed to create data directory '{}': {}", path.display(), e),
            Some("Check permissions or select a different location"),
        )
    })?;

    tracing::info!(path = %path.display(), "Created data directory");
    Ok(())
}

/// Raw row from the repositories table.
struct RepositoryRow {
    id: String,
    display_name: String,
    database_connection: String,
    description: String,
    is_default: bool,
    created_at: String,
    updated_at: String,
}

impl RepositoryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            display_name: row.get(1)?,
            database_connection: row.get(2)?,
            description: row.get(3)?,
            is_default: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_repository(self) -> Result<SavedRepository, RepoError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepoError::storage(format!("Invalid repository ID: {e}"), None))?;

        Ok(SavedRepository {
            id,
            display_name: self.display_name,
            database_connection: self.database_connection,
            description: self.description,
            is_default: self.is_default,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::storage(format!("Invalid timestamp '{value}': {e}"), None))
}

const SELECT_COLUMNS: &str = "SELECT repository_id, display_name, database_connection, description,
        is_default, created_at, updated_at
 FROM repositories";

/// SQLite-based local storage for saved repositories.
///
/// Thread-safe via internal Mutex.
pub struct LocalStorage {
    connection: Mutex<Connection>,
}

impl LocalStorage {
    /// Open or create `repoman.db` in the given data directory.
    pub fn open(data_dir: PathBuf) -> Result<Self, RepoError> {
        init_data_dir(&data_dir)?;
        let db_path = data_dir.join("repoman.db");

        let connection = Connection::open(&db_path).map_err(|e| {
            RepoError::storage(
                format!("Failed to open database '{}': {}", db_path.display(), e),
                Some("The database file may be corrupted. Try deleting it to start fresh."),
            )
        })?;

        Self::configure_connection(&connection)?;

        let storage = Self { connection: Mutex::new(connection) };
        storage.run_migrations()?;

        tracing::info!(path = %db_path.display(), "Local storage opened");
        Ok(storage)
    }

    fn configure_connection(conn: &Connection) -> Result<(), RepoError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA foreign_keys = ON;
            ",
        )
        .map_err(|e| RepoError::storage(format!("Failed to configure database: {e}"), None))
    }

    fn run_migrations(&self) -> Result<(), RepoError> {
        const DOMAIN: &str = "core";
        let conn = self.connection.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS migrations (
                domain TEXT NOT NULL,
                step INTEGER NOT NULL,
                migration TEXT NOT NULL,
                PRIMARY KEY(domain, step)
            ) STRICT",
            [],
        )
        .map_err(|e| RepoError::storage(format!("Failed to create migrations table: {e}"), None))?;

        let current_step: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(step), 0) FROM migrations WHERE domain = ?",
                [DOMAIN],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_step < 1 {
            conn.execute_batch(
                "
                CREATE TABLE repositories (
                    repository_id TEXT PRIMARY KEY,
                    display_name TEXT NOT NULL UNIQUE,
                    database_connection TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    is_default INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                ) STRICT;

                CREATE INDEX idx_repositories_updated ON repositories(updated_at DESC);
                ",
            )
            .map_err(|e| RepoError::storage(format!("Migration 1 failed: {e}"), None))?;

            conn.execute(
                "INSERT INTO migrations (domain, step, migration) VALUES (?, 1, 'repositories')",
                [DOMAIN],
            )
            .map_err(|e| RepoError::storage(format!("Failed to record migration: {e}"), None))?;

            tracing::info!("Applied migration 1: repositories");
        }

        Ok(())
    }

    // ========== Repository Operations ==========

    /// Save a repository, inserting or updating by ID.
    ///
    /// Saving a default repository clears the default flag on all others.
    pub fn save_repository(&self, repository: &SavedRepository) -> Result<(), RepoError> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;

        if repository.is_default {
            tx.execute(
                "UPDATE repositories SET is_default = 0 WHERE repository_id <> ?",
                [repository.id.to_string()],
            )?;
        }

        tx.execute(
            "INSERT INTO repositories (
                repository_id, display_name, database_connection, description,
                is_default, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(repository_id) DO UPDATE SET
                display_name = excluded.display_name,
                database_connection = excluded.database_connection,
                description = excluded.description,
                is_default = excluded.is_default,
                updated_at = excluded.updated_at",
            params![
                repository.id.to_string(),
                repository.display_name,
                repository.database_connection,
                repository.description,
                repository.is_default,
                repository.created_at.to_rfc3339(),
                repository.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| RepoError::storage(format!("Failed to save repository: {e}"), None))?;

        tx.commit()?;

        tracing::debug!(
            repository_id = %repository.id,
            name = %repository.display_name,
            "Repository saved"
        );
        Ok(())
    }

    /// Load a repository by ID.
    pub fn load_repository(&self, id: Uuid) -> Result<Option<SavedRepository>, RepoError> {
        let conn = self.connection.lock();

        let row = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE repository_id = ?"),
                [id.to_string()],
                RepositoryRow::from_row,
            )
            .optional()
            .map_err(|e| RepoError::storage(format!("Failed to load repository: {e}"), None))?;

        row.map(RepositoryRow::into_repository).transpose()
    }

    /// Load a repository by its display name.
    pub fn find_by_display_name(&self, name: &str) -> Result<Option<SavedRepository>, RepoError> {
        let conn = self.connection.lock();

        let row = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE display_name = ?"),
                [name],
                RepositoryRow::from_row,
            )
            .optional()
            .map_err(|e| RepoError::storage(format!("Failed to load repository: {e}"), None))?;

        row.map(RepositoryRow::into_repository).transpose()
    }

    /// Load all saved repositories, ordered by name.
    pub fn load_all_repositories(&self) -> Result<Vec<SavedRepository>, RepoError> {
        let conn = self.connection.lock();

        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY display_name"))
            .map_err(|e| RepoError::storage(format!("Failed to prepare query: {e}"), None))?;

        let rows = stmt
            .query_map([], RepositoryRow::from_row)
            .map_err(|e| RepoError::storage(format!("Failed to query repositories: {e}"), None))?;

        let mut repositories = Vec::new();
        for row in rows {
            let row = row.map_err(|e| RepoError::storage(format!("Failed to read row: {e}"), None))?;
            repositories.push(row.into_repository()?);
        }

        Ok(repositories)
    }

    /// Check whether a repository with exactly this display name exists.
    pub fn display_name_exists(&self, name: &str) -> Result<bool, RepoError> {
        let conn = self.connection.lock();

        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM repositories WHERE display_name = ?)",
            [name],
            |row| row.get(0),
        )
        .map_err(|e| RepoError::storage(format!("Failed to check display name: {e}"), None))
    }

    /// Delete a repository.
    pub fn delete_repository(&self, id: Uuid) -> Result<(), RepoError> {
        let conn = self.connection.lock();

        conn.execute("DELETE FROM repositories WHERE repository_id = ?", [id.to_string()])
            .map_err(|e| RepoError::storage(format!("Failed to delete repository: {e}"), None))?;

        tracing::debug!(repository_id = %id, "Repository deleted");
        Ok(())
    }
}
