//! Statistics from the document store
//!
//! This module provides functionality for extracting and displaying
//! store statistics and per-round reports.

use crate::crawler::{RunReport, UrlOutcome};
use crate::storage::{DocumentStore, RunRecord, StoreStats};
use crate::ScraperError;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Count, subjects and most recent update
    pub store: StoreStats,

    /// The most recent harvest round, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(store: &dyn DocumentStore) -> Result<HarvestStatistics, ScraperError> {
    Ok(HarvestStatistics {
        store: store.stats()?,
        latest_run: store.latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Stored samples: {}", stats.store.count);
    match &stats.store.latest_update {
        Some(updated) => println!("  Last updated: {}", updated.to_rfc3339()),
        None => println!("  Last updated: never"),
    }
    println!();

    if !stats.store.subjects.is_empty() {
        println!("Subjects ({}):", stats.store.subjects.len());
        for subject in &stats.store.subjects {
            println!("  - {}", subject);
        }
        println!();
    }

    if let Some(run) = &stats.latest_run {
        println!("Latest Round:");
        println!("  Run ID: {}", run.id);
        println!("  Started: {}", run.started_at);
        println!(
            "  Finished: {}",
            run.finished_at.as_deref().unwrap_or("unfinished")
        );
        println!(
            "  Stored: {} / {} ({:.1}%)",
            run.stored,
            run.attempted,
            success_rate(run.stored, run.attempted)
        );
        println!("  Config Hash: {}", run.config_hash);
    }
}

/// Prints the outcome of one harvest round
pub fn print_report(report: &RunReport) {
    println!("=== Round Report ===\n");
    println!("  Discovered: {}", report.discovered);
    println!("  Attempted: {}", report.attempted);
    println!(
        "  Stored: {} ({} created, {} updated)",
        report.stored, report.created, report.updated
    );
    println!("  Fetch failures: {}", report.fetch_failures);
    println!("  Invalid records: {}", report.invalid);
    println!("  Store failures: {}", report.store_failures);
    if report.cancelled {
        println!("  (cancelled before completion)");
    }

    let failures: Vec<_> = report
        .outcomes
        .iter()
        .filter(|(_, outcome)| !matches!(outcome, UrlOutcome::Stored(_)))
        .collect();
    if !failures.is_empty() {
        println!("\nFailures:");
        for (url, outcome) in failures {
            println!("  - {}: {}", url, describe(outcome));
        }
    }

    println!(
        "\nSuccess Rate: {:.1}% ({} / {} samples stored)",
        success_rate(report.stored as u64, report.attempted as u64),
        report.stored,
        report.attempted
    );
}

fn describe(outcome: &UrlOutcome) -> String {
    match outcome {
        UrlOutcome::Stored(o) => format!("stored ({:?})", o),
        UrlOutcome::FetchFailed(reason) => format!("fetch failed: {}", reason),
        UrlOutcome::Invalid(reason) => format!("invalid: {}", reason),
        UrlOutcome::StoreFailed(reason) => format!("store failed: {}", reason),
    }
}

pub(crate) fn success_rate(stored: u64, attempted: u64) -> f64 {
    if attempted == 0 {
        0.0
    } else {
        stored as f64 / attempted as f64 * 100.0
    }
}
