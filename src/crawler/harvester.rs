//! Harvest coordinator - main round orchestration logic
//!
//! A round runs discovery from every seed, then assembles, validates and
//! stores each discovered sample. Per-URL failures never abort a round;
//! they are counted in the [`RunReport`].

use crate::config::{Config, ScraperConfig};
use crate::crawler::discovery::discover;
use crate::crawler::fetcher::{DelayRange, Fetcher};
use crate::crawler::transport::{HttpTransport, Transport};
use crate::record::{assemble, validate};
use crate::storage::{open_store, DocumentStore, SqliteStore, UpsertOutcome};
use crate::ScraperError;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What happened to one discovered URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlOutcome {
    Stored(UpsertOutcome),
    FetchFailed(String),
    Invalid(String),
    StoreFailed(String),
}

/// Totals and per-URL outcomes of one round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub discovered: usize,
    pub attempted: usize,
    pub stored: usize,
    pub created: usize,
    pub updated: usize,
    pub fetch_failures: usize,
    pub invalid: usize,
    pub store_failures: usize,
    pub cancelled: bool,
    pub outcomes: Vec<(Url, UrlOutcome)>,
}

impl RunReport {
    fn record(&mut self, url: Url, outcome: UrlOutcome) {
        self.attempted += 1;
        match &outcome {
            UrlOutcome::Stored(UpsertOutcome::Created) => {
                self.stored += 1;
                self.created += 1;
            }
            UrlOutcome::Stored(UpsertOutcome::Updated) => {
                self.stored += 1;
                self.updated += 1;
            }
            UrlOutcome::FetchFailed(_) => self.fetch_failures += 1,
            UrlOutcome::Invalid(_) => self.invalid += 1,
            UrlOutcome::StoreFailed(_) => self.store_failures += 1,
        }
        self.outcomes.push((url, outcome));
    }

    /// The outcome recorded for `url`
    pub fn outcome(&self, url: &Url) -> Option<&UrlOutcome> {
        self.outcomes
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, outcome)| outcome)
    }
}

/// Main harvest coordinator structure
pub struct Harvester<S, T = HttpTransport> {
    settings: ScraperConfig,
    seeds: Vec<Url>,
    transport: T,
    store: S,
    config_hash: String,
}

impl<S: DocumentStore, T: Transport + Clone> Harvester<S, T> {
    pub fn new(settings: ScraperConfig, seeds: Vec<Url>, transport: T, store: S) -> Self {
        Self {
            settings,
            seeds,
            transport,
            store,
            config_hash: String::new(),
        }
    }

    /// Builds a harvester from a validated configuration
    pub fn from_config(config: &Config, transport: T, store: S) -> Result<Self, ScraperError> {
        let seeds = config
            .seeds
            .urls
            .iter()
            .map(|s| Url::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(config.scraper.clone(), seeds, transport, store))
    }

    /// Hash recorded with every round in the store
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one discovery-and-store round with a fresh fetcher
    pub async fn run_round(&mut self, cancel: &CancellationToken) -> RunReport {
        let start_time = Instant::now();
        let fetcher = Fetcher::new(
            self.transport.clone(),
            DelayRange::new(self.settings.min_delay_ms, self.settings.max_delay_ms),
        );
        let mut report = RunReport::default();

        if self.seeds.is_empty() {
            tracing::info!("No seeds configured, nothing to harvest");
            return report;
        }

        let run_id = match self.store.start_run(&self.config_hash) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Failed to record round start: {}", e);
                None
            }
        };

        let mut urls = BTreeSet::new();
        for seed in &self.seeds {
            if cancel.is_cancelled() {
                break;
            }
            tracing::info!("Discovering samples from {}", seed);
            let found = discover(
                &fetcher,
                seed,
                self.settings.max_samples,
                &self.settings.sample_path,
                cancel,
            )
            .await;
            urls.extend(found);
        }
        report.discovered = urls.len();
        tracing::info!(
            "Discovered {} samples from {} seeds",
            urls.len(),
            self.seeds.len()
        );

        let total = urls.len();
        for (index, url) in urls.into_iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!("Round cancelled after {} of {} samples", index, total);
                report.cancelled = true;
                break;
            }

            let outcome = self.process_url(&fetcher, &url).await;
            report.record(url, outcome);
            tracing::info!("Processed {}/{} samples", index + 1, total);
        }
        report.cancelled |= cancel.is_cancelled();

        if let Some(id) = run_id {
            if let Err(e) = self.store.finish_run(id, report.attempted, report.stored) {
                tracing::warn!("Failed to record round end: {}", e);
            }
        }

        tracing::info!(
            "Round complete: {}/{} samples stored ({} created, {} updated) in {:?}",
            report.stored,
            report.attempted,
            report.created,
            report.updated,
            start_time.elapsed()
        );
        match self.store.stats() {
            Ok(stats) => tracing::info!(
                "Store holds {} samples across {} subjects",
                stats.count,
                stats.subjects.len()
            ),
            Err(e) => tracing::warn!("Failed to read store stats: {}", e),
        }

        report
    }

    /// Repeats rounds until `cancel` fires, pausing between rounds
    ///
    /// Returns the number of rounds started.
    pub async fn watch(&mut self, cancel: &CancellationToken) -> usize {
        let mut rounds = 0;
        while !cancel.is_cancelled() {
            rounds += 1;
            tracing::info!("Starting round {}", rounds);
            self.run_round(cancel).await;

            tokio::select! {
                _ = tokio::time::sleep(self.settings.round_delay()) => {}
                _ = cancel.cancelled() => break,
            }
        }
        tracing::info!("Watch mode stopped after {} rounds", rounds);
        rounds
    }

    /// Assembles, validates and stores one URL
    async fn process_url(&mut self, fetcher: &Fetcher<T>, url: &Url) -> UrlOutcome {
        let record = match assemble(fetcher, url, &self.settings.subject).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                return UrlOutcome::FetchFailed(e.to_string());
            }
        };

        if let Err(e) = validate(&record) {
            tracing::warn!("Rejecting {}: {}", url, e);
            return UrlOutcome::Invalid(e.to_string());
        }

        let value = match record.to_value() {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize {}: {}", url, e);
                return UrlOutcome::StoreFailed(e.to_string());
            }
        };

        match self.store.upsert(&value) {
            Ok(outcome) => {
                tracing::debug!("Stored {} ({:?})", url, outcome);
                UrlOutcome::Stored(outcome)
            }
            Err(e) => {
                tracing::error!("Failed to store {}: {}", url, e);
                UrlOutcome::StoreFailed(e.to_string())
            }
        }
    }
}

/// Runs a single harvest round against the configured store
///
/// This is the main entry point for a one-shot harvest. It will:
/// 1. Open the document store
/// 2. Build the HTTP transport
/// 3. Discover samples from every seed
/// 4. Assemble, validate and store each sample
pub async fn run_harvest(
    config: &Config,
    config_hash: &str,
    cancel: &CancellationToken,
) -> Result<RunReport, ScraperError> {
    let store = open_store(Path::new(&config.output.database_path))?;
    let mut harvester = build_harvester(config, store)?.with_config_hash(config_hash);
    Ok(harvester.run_round(cancel).await)
}

/// Builds the production harvester: HTTP transport over a SQLite store
pub fn build_harvester(
    config: &Config,
    store: SqliteStore,
) -> Result<Harvester<SqliteStore>, ScraperError> {
    let transport = HttpTransport::from_config(config)?;
    Harvester::from_config(config, transport, store)
}
