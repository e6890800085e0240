use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sample-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub seeds: SeedConfig,
}

/// Discovery and fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Maximum number of sample URLs discovered from each seed
    #[serde(rename = "max-samples", default = "default_max_samples")]
    pub max_samples: usize,

    /// Lower bound of the random pre-request delay (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the random pre-request delay (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Transport-level retries for 429/5xx and timeouts
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base of the exponential retry backoff (milliseconds)
    #[serde(rename = "backoff-ms", default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Subject stamped on every record
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Path fragment identifying a sample page
    #[serde(rename = "sample-path", default = "default_sample_path")]
    pub sample_path: String,

    /// Pause between rounds in watch mode (seconds)
    #[serde(rename = "round-delay-secs", default = "default_round_delay_secs")]
    pub round_delay_secs: u64,
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn round_delay(&self) -> Duration {
        Duration::from_secs(self.round_delay_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_samples: default_max_samples(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            request_timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            subject: default_subject(),
            sample_path: default_sample_path(),
            round_delay_secs: default_round_delay_secs(),
        }
    }
}

fn default_max_samples() -> usize {
    5
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    3000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    300
}

fn default_subject() -> String {
    "Math AI SL".to_string()
}

fn default_sample_path() -> String {
    "/ia-sample/ib-math-ai-sl/".to_string()
}

fn default_round_delay_secs() -> u64 {
    5
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite document store
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown catalog written by --export-summary
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

/// Seed pages discovery starts from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub urls: Vec<String>,
}
