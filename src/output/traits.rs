//! Output error and summary types
//!
//! This module defines the error type for output operations and the data
//! structure a catalog is rendered from.

use crate::record::DocumentRecord;
use crate::storage::{RunRecord, StoreStats};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything needed to render a catalog of stored samples
#[derive(Debug, Clone)]
pub struct CatalogSummary {
    pub generated_at: DateTime<Utc>,
    pub stats: StoreStats,
    pub latest_run: Option<RunRecord>,
    /// Stored samples, most recently updated first
    pub samples: Vec<DocumentRecord>,
    /// Stored documents that no longer parse as records
    pub unreadable: usize,
}

impl CatalogSummary {
    pub fn total_checklist_items(&self) -> usize {
        self.samples
            .iter()
            .flat_map(|s| s.sections.values())
            .map(|section| section.checklist_items.len())
            .sum()
    }

    pub fn total_attachments(&self) -> usize {
        self.samples.iter().map(|s| s.file_links.len()).sum()
    }

    /// Mean word count over samples that report one
    pub fn average_word_count(&self) -> Option<f64> {
        let counts: Vec<u32> = self.samples.iter().filter_map(|s| s.word_count).collect();
        if counts.is_empty() {
            return None;
        }
        let total: u64 = counts.iter().map(|&c| u64::from(c)).sum();
        Some(total as f64 / counts.len() as f64)
    }
}
