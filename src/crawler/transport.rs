//! HTTP transport
//!
//! This module handles the network side of fetching:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for page bodies
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::{Config, UserAgentConfig};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Something that can turn a URL into a page body
///
/// The fetcher owns politeness and deduplication; a transport only moves
/// bytes and decides which failures are worth retrying.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> FetchResult<String>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &Url) -> FetchResult<String> {
        (**self).get(url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sample_harvest::config::UserAgentConfig;
/// use sample_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "SampleHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed transport with retry
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 429, 500, 502, 503, 504 | Retry up to `max_retries` times |
/// | Timeout | Retry up to `max_retries` times |
/// | Connection refused | Retry up to `max_retries` times |
/// | Any other non-2xx | Immediate failure |
///
/// The wait before retry `n` (0-based) is `backoff * 2^n`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    max_retries: u32,
    backoff: Duration,
}

impl HttpTransport {
    pub fn new(client: Client, max_retries: u32, backoff: Duration) -> Self {
        Self {
            client,
            max_retries,
            backoff,
        }
    }

    /// Builds the client and retry policy from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.scraper.request_timeout())?;
        Ok(Self::new(
            client,
            config.scraper.max_retries,
            Duration::from_millis(config.scraper.backoff_ms),
        ))
    }

    async fn attempt(&self, url: &Url) -> FetchResult<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(url, e))
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff.saturating_mul(factor)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> FetchResult<String> {
        let mut attempt = 0;
        loop {
            match self.attempt(url).await {
                Ok(body) => {
                    tracing::debug!("Fetched {} ({} bytes)", url, body.len());
                    return Ok(body);
                }
                Err(e) if is_retryable(&e) && attempt < self.max_retries => {
                    let wait = self.backoff_for(attempt);
                    tracing::warn!(
                        "{} (attempt {}/{}), retrying in {:?}",
                        e,
                        attempt + 1,
                        self.max_retries + 1,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether a failure is transient enough to retry
pub fn is_retryable(error: &FetchError) -> bool {
    match error {
        FetchError::Status { status, .. } => matches!(
            StatusCode::from_u16(*status),
            Ok(StatusCode::TOO_MANY_REQUESTS
                | StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT)
        ),
        FetchError::Timeout { .. } | FetchError::Connect { .. } => true,
        FetchError::AlreadyProcessed { .. } | FetchError::Transport { .. } => false,
    }
}

fn classify(url: &Url, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        FetchError::Connect {
            url,
            message: error.to_string(),
        }
    } else {
        FetchError::Transport {
            url,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            url: "https://example.com/".to_string(),
            status: code,
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [429, 500, 502, 503, 504] {
            assert!(is_retryable(&status(code)), "{} should retry", code);
        }
        for code in [400, 401, 403, 404, 501] {
            assert!(!is_retryable(&status(code)), "{} should not retry", code);
        }
    }

    #[test]
    fn test_retryable_network_errors() {
        let url = "https://example.com/".to_string();
        assert!(is_retryable(&FetchError::Timeout { url: url.clone() }));
        assert!(is_retryable(&FetchError::Connect {
            url: url.clone(),
            message: "refused".to_string(),
        }));
        assert!(!is_retryable(&FetchError::Transport {
            url: url.clone(),
            message: "decode".to_string(),
        }));
        assert!(!is_retryable(&FetchError::AlreadyProcessed { url }));
    }

    #[test]
    fn test_backoff_doubles() {
        let client = build_http_client(&create_test_config(), Duration::from_secs(5)).unwrap();
        let transport = HttpTransport::new(client, 3, Duration::from_millis(300));
        assert_eq!(transport.backoff_for(0), Duration::from_millis(300));
        assert_eq!(transport.backoff_for(1), Duration::from_millis(600));
        assert_eq!(transport.backoff_for(2), Duration::from_millis(1200));
    }
}
