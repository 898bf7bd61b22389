//! Job application tracker: SQLite storage, default-value rules and
//! importers for CSV files, remote CSV documents and IMAP mailboxes.

pub mod db;
pub mod email;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod repository;
pub mod tracker;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use models::{Application, Statistics};
pub use repository::ApplicationRepository;
pub use tracker::JobTracker;
