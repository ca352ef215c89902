//! Application configuration.
//!
//! Sources, later ones win:
//! 1. Built-in defaults
//! 2. `config.json` in the data directory
//! 3. `REPOMAN_*` environment variables

use crate::error::RepoError;
use crate::services::storage::default_data_dir;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the data directory.
pub const DATA_DIR_ENV: &str = "REPOMAN_DATA_DIR";
/// Overrides the duplicate check timeout, in milliseconds.
pub const CHECK_TIMEOUT_ENV: &str = "REPOMAN_CHECK_TIMEOUT_MS";
/// Points at a JSON message bundle overlay.
pub const MESSAGES_ENV: &str = "REPOMAN_MESSAGES";

const CONFIG_FILE: &str = "config.json";
const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Contents of `config.json`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    log_filter: Option<String>,
    check_timeout_ms: Option<u64>,
    messages_path: Option<PathBuf>,
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the database, logs and config file
    pub data_dir: PathBuf,
    /// Custom log filter (takes priority over REPOMAN_LOG/RUST_LOG)
    pub log_filter: Option<String>,
    /// How long the details form waits for a duplicate check
    pub check_timeout: Duration,
    /// Optional JSON message bundle overlay
    pub messages_path: Option<PathBuf>,
}

impl AppConfig {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            log_filter: None,
            check_timeout: DEFAULT_CHECK_TIMEOUT,
            messages_path: None,
        }
    }

    /// Load configuration from the process environment and config file.
    pub fn load() -> Result<Self, RepoError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `env` to look up variables.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, RepoError> {
        let data_dir = env(DATA_DIR_ENV).map(PathBuf::from).unwrap_or_else(default_data_dir);
        let mut config = Self::new(data_dir);

        let file_path = config.data_dir.join(CONFIG_FILE);
        if file_path.is_file() {
            config.apply_file(&file_path)?;
        }

        if let Some(value) = env(CHECK_TIMEOUT_ENV) {
            config.check_timeout = parse_timeout_ms(&value)?;
        }
        if let Some(path) = env(MESSAGES_ENV) {
            config.messages_path = Some(PathBuf::from(path));
        }

        tracing::debug!(
            data_dir = %config.data_dir.display(),
            check_timeout_ms = config.check_timeout.as_millis() as u64,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), RepoError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RepoError::config(format!("Failed to read '{}': {e}", path.display())))?;
        let file: ConfigFile = serde_json::from_str(&contents)
            .map_err(|e| RepoError::config(format!("Invalid '{}': {e}", path.display())))?;

        if let Some(filter) = file.log_filter {
            self.log_filter = Some(filter);
        }
        if let Some(ms) = file.check_timeout_ms {
            self.check_timeout = timeout_from_ms(ms)?;
        }
        if let Some(messages) = file.messages_path {
            // Relative paths are relative to the data directory.
            self.messages_path = Some(if messages.is_relative() {
                self.data_dir.join(messages)
            } else {
                messages
            });
        }
        Ok(())
    }

    /// Directory for log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn parse_timeout_ms(value: &str) -> Result<Duration, RepoError> {
    let ms = value.trim().parse::<u64>().map_err(|_| {
        RepoError::config(format!("{CHECK_TIMEOUT_ENV} must be a number of milliseconds, got '{value}'"))
    })?;
    timeout_from_ms(ms)
}

fn timeout_from_ms(ms: u64) -> Result<Duration, RepoError> {
    if ms == 0 {
        return Err(RepoError::config("Duplicate check timeout must be greater than zero"));
    }
    Ok(Duration::from_millis(ms))
}
