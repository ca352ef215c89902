//! repoman - edit database repository connections from a terminal.

mod form;

use repoman_core::logging::{init_logging, LogConfig, LogOutput};
use repoman_core::{AppConfig, RepoState};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("repoman: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging before RepoState so storage setup is captured
    let logging_guard = init_logging(LogConfig::from_app_config(&config));

    match logging_guard.output() {
        LogOutput::File(dir) => tracing::info!(log_dir = %dir.display(), "Starting repoman"),
        LogOutput::Stderr => tracing::info!("Starting repoman"),
    }

    let state = match RepoState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize RepoState");
            let info = e.to_error_info();
            eprintln!("{}: {}", info.error_type, info.message);
            if let Some(hint) = info.hint {
                eprintln!("hint: {hint}");
            }
            return ExitCode::FAILURE;
        }
    };

    let stdin = std::io::stdin();
    let result = form::run(&state, stdin.lock(), std::io::stdout());

    match result {
        Ok(()) => {
            tracing::info!("repoman finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Form driver failed");
            eprintln!("repoman: {e}");
            ExitCode::FAILURE
        }
    }
}
