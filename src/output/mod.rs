//! Output module for store summaries and reports
//!
//! This module handles:
//! - Generating markdown catalogs of stored samples
//! - Printing store statistics and round reports

mod markdown;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_report, print_statistics, HarvestStatistics};
pub use traits::{CatalogSummary, OutputError, OutputResult};

use crate::record::DocumentRecord;
use crate::storage::{DocumentFilter, DocumentStore};
use crate::ScraperError;
use chrono::Utc;

/// Documents fetched from the store per query
const PAGE_SIZE: usize = 100;

/// Builds a catalog summary of everything in the store
pub fn generate_summary(store: &dyn DocumentStore) -> Result<CatalogSummary, ScraperError> {
    let stats = store.stats()?;
    let latest_run = store.latest_run()?;

    let filter = DocumentFilter::default();
    let mut samples = Vec::new();
    let mut unreadable = 0;
    let mut skip = 0;

    loop {
        let page = store.query(&filter, skip, PAGE_SIZE)?;
        let fetched = page.len();

        for value in page {
            match DocumentRecord::from_value(value) {
                Ok(record) => samples.push(record),
                Err(e) => {
                    tracing::warn!("Skipping unreadable document: {}", e);
                    unreadable += 1;
                }
            }
        }

        if fetched < PAGE_SIZE {
            break;
        }
        skip += fetched;
    }

    Ok(CatalogSummary {
        generated_at: Utc::now(),
        stats,
        latest_run,
        samples,
        unreadable,
    })
}
