//! Data models for repoman.
//!
//! - `connection` - ConnectionRecord edited by the details form
//! - `navigation` - NavigationTarget and RepositoryType
//! - `repository` - SavedRepository persisted in local storage

pub mod connection;
pub mod navigation;
pub mod repository;

pub use connection::{ConnectionRecord, NO_DATABASE};
pub use navigation::{NavigationTarget, RepositoryType};
pub use repository::SavedRepository;
