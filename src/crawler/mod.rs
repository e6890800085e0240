//! Crawler module for sample discovery and harvesting
//!
//! This module contains the network-facing logic, including:
//! - HTTP transport with retry logic
//! - A run-scoped fetcher with politeness delay and deduplication
//! - Bounded frontier traversal from seed pages
//! - Overall harvest coordination

mod discovery;
mod fetcher;
mod frontier;
mod harvester;
mod transport;

pub use discovery::discover;
pub use fetcher::{DelayRange, Fetcher};
pub use frontier::FrontierState;
pub use harvester::{build_harvester, run_harvest, Harvester, RunReport, UrlOutcome};
pub use transport::{build_http_client, is_retryable, HttpTransport, Transport};
