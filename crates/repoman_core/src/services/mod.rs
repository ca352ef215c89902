//! Services backing the details form.
//!
//! - `messages` - Localized label lookup
//! - `duplicate` - Duplicate display-name checks
//! - `router` - Navigation between form states
//! - `storage` - Local SQLite storage for saved repositories

pub mod duplicate;
pub mod messages;
pub mod router;
pub mod storage;

pub use duplicate::{DuplicateChecker, StorageDuplicateChecker};
pub use messages::{Localizer, MessageBundle};
pub use router::{Navigator, StateRouter};
pub use storage::LocalStorage;
