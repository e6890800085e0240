//! Storage module for persisting harvested documents
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Document upsert keyed by URL
//! - Filtered, paginated queries and aggregate statistics
//! - Harvest round tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{
    DocumentFilter, DocumentStore, RunRecord, StorageError, StorageResult, StoreStats,
    UpsertOutcome,
};

use crate::ScraperError;
use std::path::Path;

/// Initializes or opens a document store
pub fn open_store(path: &Path) -> Result<SqliteStore, ScraperError> {
    SqliteStore::new(path)
}
