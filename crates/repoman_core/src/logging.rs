//! Logging for the terminal form.
//!
//! The form owns stdout, so log lines never go there. Everything lands in a
//! daily rolling file under `<data_dir>/logs`; stderr carries a copy at a
//! level that depends on whether a person is watching it.

use crate::config::AppConfig;

use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before RUST_LOG.
pub const LOG_ENV: &str = "REPOMAN_LOG";

const LOG_FILE_PREFIX: &str = "repoman";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for rolling log files
    pub log_dir: PathBuf,
    /// Filter from `config.json`, ahead of any environment variable
    pub log_filter: Option<String>,
    /// Whether stderr is a terminal shared with the form prompt
    pub interactive: bool,
}

impl LogConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            log_dir: config.log_dir(),
            log_filter: config.log_filter.clone(),
            interactive: atty::is(atty::Stream::Stderr),
        }
    }

    /// Most verbose level copied to stderr.
    ///
    /// Only warnings interrupt someone typing into the form; a redirected
    /// stderr gets the lifecycle messages too.
    pub fn stderr_level(&self) -> Level {
        if self.interactive {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

/// Where log output ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Rolling files in this directory, plus stderr.
    File(PathBuf),
    /// The log directory was unusable.
    Stderr,
}

/// Keeps the background file writer alive; dropping it flushes.
pub struct LoggingGuard {
    output: LogOutput,
    _worker_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    pub fn output(&self) -> &LogOutput {
        &self.output
    }
}

/// Install the global subscriber.
///
/// Falls back to stderr alone when the log directory cannot be created.
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    let filter = resolve_filter(config.log_filter.as_deref(), |key| std::env::var(key).ok());
    let stderr = std::io::stderr.with_max_level(config.stderr_level());

    let appender = std::fs::create_dir_all(&config.log_dir)
        .map_err(|e| e.to_string())
        .and_then(|()| rolling_appender(&config.log_dir));

    match appender {
        Ok(appender) => {
            let (file, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_writer(stderr.and(file))
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(true)
                .init();

            LoggingGuard { output: LogOutput::File(config.log_dir), _worker_guard: Some(guard) }
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_writer(stderr)
                .with_env_filter(filter)
                .with_ansi(config.interactive)
                .with_target(false)
                .init();

            tracing::warn!(
                log_dir = %config.log_dir.display(),
                error = %e,
                "File logging unavailable, logging to stderr only"
            );
            LoggingGuard { output: LogOutput::Stderr, _worker_guard: None }
        }
    }
}

fn rolling_appender(log_dir: &Path) -> Result<RollingFileAppender, String> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| e.to_string())
}

/// Pick the log filter.
///
/// Priority: config file > REPOMAN_LOG > RUST_LOG > build default. A value
/// that does not parse is skipped rather than silencing everything.
fn resolve_filter(custom: Option<&str>, env: impl Fn(&str) -> Option<String>) -> EnvFilter {
    let candidates = custom
        .map(str::to_string)
        .into_iter()
        .chain(env(LOG_ENV))
        .chain(env("RUST_LOG"));

    for directives in candidates {
        match EnvFilter::try_new(&directives) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("repoman: ignoring log filter '{directives}': {e}"),
        }
    }
    EnvFilter::new(default_log_filter())
}

/// Default filter for this build type.
pub fn default_log_filter() -> &'static str {
    #[cfg(debug_assertions)]
    {
        "info,repoman=debug,repoman_core=debug,rusqlite=warn"
    }
    #[cfg(not(debug_assertions))]
    {
        "warn,repoman=info,repoman_core=info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_log_config_from_app_config() {
        let mut app = AppConfig::new(PathBuf::from("/tmp/repoman"));
        app.log_filter = Some("warn".to_string());

        let config = LogConfig::from_app_config(&app);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/repoman/logs"));
        assert_eq!(config.log_filter.as_deref(), Some("warn"));
    }

    #[test]
    fn test_stderr_level_quieter_when_interactive() {
        let mut config = LogConfig::from_app_config(&AppConfig::new(PathBuf::from("/tmp/r")));

        config.interactive = true;
        assert_eq!(config.stderr_level(), Level::WARN);
        config.interactive = false;
        assert_eq!(config.stderr_level(), Level::INFO);
    }

    #[test]
    fn test_filter_priority() {
        let env = |key: &str| match key {
            LOG_ENV => Some("repoman=trace".to_string()),
            "RUST_LOG" => Some("error".to_string()),
            _ => None,
        };

        assert_eq!(resolve_filter(Some("warn"), env).to_string(), "warn");
        assert_eq!(resolve_filter(None, env).to_string(), "repoman=trace");

        let rust_log_only = |key: &str| (key == "RUST_LOG").then(|| "error".to_string());
        assert_eq!(resolve_filter(None, rust_log_only).to_string(), "error");
    }

    #[test]
    fn test_invalid_filter_falls_through() {
        let env = |key: &str| (key == LOG_ENV).then(|| "debug".to_string());
        assert_eq!(resolve_filter(Some("repoman=loud"), env).to_string(), "debug");

        let fallback = resolve_filter(Some("repoman=loud"), no_env);
        assert_eq!(fallback.to_string(), EnvFilter::new(default_log_filter()).to_string());
    }
}
