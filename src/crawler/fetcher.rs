//! Polite, deduplicating page fetcher
//!
//! A [`Fetcher`] lives for one harvest round. It guarantees:
//! - a URL is requested from the network at most once per round
//! - every network request is preceded by a random delay
//! - bodies fetched during discovery stay available to the assembler

use crate::crawler::transport::{HttpTransport, Transport};
use crate::{FetchError, FetchResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use url::Url;

/// Uniform random delay applied before each outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl DelayRange {
    /// Bounds are swapped if given out of order
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// No delay at all
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn sample(&self) -> Duration {
        Duration::from_millis(fastrand::u64(self.min_ms..=self.max_ms))
    }
}

#[derive(Debug, Default)]
struct FetchState {
    /// URLs fetched or in flight this round
    claimed: HashSet<Url>,
    /// Bodies fetched but not yet taken by the assembler
    pages: HashMap<Url, String>,
    /// Successful requests this round
    fetched: usize,
}

/// Run-scoped fetcher shared by discovery and record assembly
pub struct Fetcher<T = HttpTransport> {
    transport: T,
    delay: DelayRange,
    state: Mutex<FetchState>,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, delay: DelayRange) -> Self {
        Self {
            transport,
            delay,
            state: Mutex::new(FetchState::default()),
        }
    }

    /// Requests `url` from the network
    ///
    /// Returns [`FetchError::AlreadyProcessed`] immediately, with no delay
    /// and no request, if the URL was already fetched or is in flight. A
    /// failed request releases the URL so a later call may try again.
    pub async fn fetch(&self, url: &Url) -> FetchResult<String> {
        if !self.state().claimed.insert(url.clone()) {
            tracing::debug!("Skipping {}: already processed", url);
            return Err(FetchError::AlreadyProcessed {
                url: url.to_string(),
            });
        }

        let wait = self.delay.sample();
        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before requesting {}", wait, url);
            tokio::time::sleep(wait).await;
        }

        tracing::info!("Fetching {}", url);
        match self.transport.get(url).await {
            Ok(body) => {
                let mut state = self.state();
                state.pages.insert(url.clone(), body.clone());
                state.fetched += 1;
                Ok(body)
            }
            Err(e) => {
                self.state().claimed.remove(url);
                Err(e)
            }
        }
    }

    /// Returns the body for `url`, reusing one fetched earlier this round
    pub async fn page(&self, url: &Url) -> FetchResult<String> {
        if let Some(body) = self.cached(url) {
            tracing::debug!("Reusing fetched body for {}", url);
            return Ok(body);
        }
        self.fetch(url).await
    }

    /// Like [`Fetcher::page`], but releases the retained body
    ///
    /// The URL stays claimed, so a later request for it is still
    /// [`FetchError::AlreadyProcessed`].
    pub async fn take_page(&self, url: &Url) -> FetchResult<String> {
        let retained = self.state().pages.remove(url);
        if let Some(body) = retained {
            tracing::debug!("Taking fetched body for {}", url);
            return Ok(body);
        }

        let body = self.fetch(url).await?;
        self.state().pages.remove(url);
        Ok(body)
    }

    /// Body retained from an earlier successful fetch
    pub fn cached(&self, url: &Url) -> Option<String> {
        self.state().pages.get(url).cloned()
    }

    /// Whether `url` has been fetched or is in flight
    pub fn is_processed(&self, url: &Url) -> bool {
        self.state().claimed.contains(url)
    }

    /// Number of pages successfully fetched this round
    pub fn fetched_count(&self) -> usize {
        self.state().fetched
    }

    fn state(&self) -> MutexGuard<'_, FetchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
