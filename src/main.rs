//! Sample-Harvest main entry point
//!
//! This is the command-line interface for the Sample-Harvest sample
//! harvester.

use anyhow::{Context, Result};
use clap::Parser;
use sample_harvest::config::{load_config_with_hash, Config};
use sample_harvest::crawler::build_harvester;
use sample_harvest::output::{
    generate_markdown_summary, generate_summary, load_statistics, print_report, print_statistics,
};
use sample_harvest::storage::{open_store, DocumentFilter, DocumentStore};
use sample_harvest::DocumentRecord;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sample-Harvest: a polite academic-sample harvester
///
/// Sample-Harvest discovers sample pages by following related-sample links
/// from seed pages, extracts a six-section record from each one and stores
/// the valid records in a SQLite document store.
#[derive(Parser, Debug)]
#[command(name = "sample-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite academic-sample harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Keep harvesting in rounds until interrupted
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_summary", "show", "list"])]
    watch: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with_all = ["stats", "export_summary", "show", "list"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary", "show", "list"])]
    stats: bool,

    /// Generate markdown catalog from stored samples and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "show", "list"])]
    export_summary: bool,

    /// Print the stored record for URL as JSON and exit
    #[arg(long, value_name = "URL")]
    show: Option<String>,

    /// List stored samples and exit
    #[arg(long)]
    list: bool,

    /// With --list: case-insensitive search over title, description and introduction
    #[arg(long, requires = "list")]
    search: Option<String>,

    /// With --list: only samples of this subject
    #[arg(long, requires = "list")]
    subject: Option<String>,

    /// With --list: number of samples to skip
    #[arg(long, default_value_t = 0, requires = "list")]
    skip: usize,

    /// With --list: maximum number of samples to show
    #[arg(long, default_value_t = 20, requires = "list")]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config).with_context(|| {
        format!("Failed to load configuration from {}", cli.config.display())
    })?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else if let Some(url) = &cli.show {
        handle_show(&config, url)?;
    } else if cli.list {
        let filter = DocumentFilter {
            subject: cli.subject.clone(),
            text: cli.search.clone(),
        };
        handle_list(&config, &filter, cli.skip, cli.limit)?;
    } else {
        handle_harvest(&config, &config_hash, cli.watch).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sample_harvest=info,warn"),
            1 => EnvFilter::new("sample_harvest=debug,info"),
            2 => EnvFilter::new("sample_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_config_store(config: &Config) -> Result<sample_harvest::SqliteStore> {
    open_store(Path::new(&config.output.database_path)).with_context(|| {
        format!("Failed to open database {}", config.output.database_path)
    })
}

/// Handles the --dry-run mode: shows the validated config and seeds
fn handle_dry_run(config: &Config) {
    println!("=== Sample-Harvest Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Subject: {}", config.scraper.subject);
    println!("  Sample path: {}", config.scraper.sample_path);
    println!("  Max samples per seed: {}", config.scraper.max_samples);
    println!(
        "  Request delay: {}-{}ms",
        config.scraper.min_delay_ms, config.scraper.max_delay_ms
    );
    println!(
        "  Request timeout: {}s",
        config.scraper.request_timeout_secs
    );
    println!(
        "  Retries: {} (backoff {}ms)",
        config.scraper.max_retries, config.scraper.backoff_ms
    );
    println!("  Round delay: {}s", config.scraper.round_delay_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\nSeeds ({}):", config.seeds.urls.len());
    for seed in &config.seeds.urls {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would discover up to {} samples",
        config.scraper.max_samples * config.seeds.urls.len()
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_config_store(config)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates the markdown catalog
fn handle_export_summary(config: &Config) -> Result<()> {
    println!("=== Exporting Sample Catalog ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let store = open_config_store(config)?;

    tracing::info!("Loading samples from database...");
    let summary = generate_summary(&store)?;

    tracing::info!("Generating markdown catalog...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))
        .with_context(|| format!("Failed to write {}", config.output.summary_path))?;

    println!(
        "✓ Catalog of {} samples exported to: {}",
        summary.samples.len(),
        config.output.summary_path
    );

    Ok(())
}

/// Handles the --show mode: prints one stored record
fn handle_show(config: &Config, url: &str) -> Result<()> {
    let store = open_config_store(config)?;

    match store.get_by_key(url)? {
        Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
        None => anyhow::bail!("No stored sample for {}", url),
    }

    Ok(())
}

/// Handles the --list mode: one line per matching sample
fn handle_list(config: &Config, filter: &DocumentFilter, skip: usize, limit: usize) -> Result<()> {
    let store = open_config_store(config)?;
    let documents = store.query(filter, skip, limit)?;

    if documents.is_empty() {
        println!("No matching samples");
        return Ok(());
    }

    for document in documents {
        match DocumentRecord::from_value(document) {
            Ok(record) => println!(
                "{}  {}  [{}] {}/6 sections  {}",
                record.last_updated.format("%Y-%m-%d"),
                record.title,
                record.subject,
                record.filled_sections(),
                record.url
            ),
            Err(e) => tracing::warn!("Skipping unreadable document: {}", e),
        }
    }

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config, config_hash: &str, watch: bool) -> Result<()> {
    tracing::info!(
        "Subject: {}, seeds: {}, max samples per seed: {}",
        config.scraper.subject,
        config.seeds.urls.len(),
        config.scraper.max_samples
    );

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after the current sample");
            signal_token.cancel();
        }
    });

    let store = open_config_store(config)?;
    let mut harvester = build_harvester(config, store)
        .context("Failed to set up harvester")?
        .with_config_hash(config_hash);

    if watch {
        let rounds = harvester.watch(&cancel).await;
        tracing::info!("Harvest stopped after {} rounds", rounds);
    } else {
        let report = harvester.run_round(&cancel).await;
        print_report(&report);
    }

    Ok(())
}
