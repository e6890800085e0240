//! Storage traits and error types
//!
//! This module defines the trait interface for document store backends and
//! associated error types. Documents cross this boundary as plain JSON
//! values so a backend never depends on the in-memory record types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Query filter; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    /// Exact subject match
    pub subject: Option<String>,
    /// Case-insensitive substring of title, description or introduction
    pub text: Option<String>,
}

impl DocumentFilter {
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Aggregate view of the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub count: u64,
    /// Distinct subjects, sorted
    pub subjects: Vec<String>,
    pub latest_update: Option<DateTime<Utc>>,
}

/// One harvest round as recorded in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub attempted: u64,
    pub stored: u64,
}

/// Trait for document store implementations
///
/// Documents are keyed by their `url` field.
pub trait DocumentStore {
    // ===== Documents =====

    /// Inserts the document, or replaces the one with the same `url`
    ///
    /// Fails with [`StorageError::InvalidDocument`] if the value is not an
    /// object with a non-empty string `url`.
    fn upsert(&mut self, document: &Value) -> StorageResult<UpsertOutcome>;

    /// Documents matching `filter`, most recently updated first
    fn query(&self, filter: &DocumentFilter, skip: usize, limit: usize) -> StorageResult<Vec<Value>>;

    /// The document stored under `url`
    fn get_by_key(&self, url: &str) -> StorageResult<Option<Value>>;

    /// Count, distinct subjects and most recent update
    fn stats(&self) -> StorageResult<StoreStats>;

    // ===== Run Tracking =====

    /// Records the start of a harvest round
    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a round finished with its totals
    fn finish_run(&mut self, run_id: i64, attempted: usize, stored: usize) -> StorageResult<()>;

    /// The most recently started round
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
