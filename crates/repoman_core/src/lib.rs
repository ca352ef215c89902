//! Core types and services for repoman.
//!
//! repoman edits database repository connections. This crate provides:
//!
//! - **details**: The connection details form controller
//! - **error**: Error handling with actionable hints
//! - **models**: Connection records, navigation targets, saved repositories
//! - **services**: Messages, duplicate checks, routing, storage
//! - **config**: Configuration from file and environment
//! - **state**: Application state management
//! - **logging**: Structured logging setup

pub mod config;
pub mod details;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use config::AppConfig;
pub use details::{DetailsController, DetailsLabels, ErrorCallback, FinishState};
pub use error::RepoError;
pub use models::{ConnectionRecord, NavigationTarget, RepositoryType, SavedRepository, NO_DATABASE};
pub use services::{
    DuplicateChecker, LocalStorage, Localizer, MessageBundle, Navigator, StateRouter,
    StorageDuplicateChecker,
};
pub use state::RepoState;
