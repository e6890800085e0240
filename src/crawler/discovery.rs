//! Bounded discovery of sample URLs from a seed page

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::FrontierState;
use crate::crawler::transport::Transport;
use crate::extract::extract_related_urls;
use scraper::Html;
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Walks related-sample links outward from `seed`
///
/// Returns at most `max_samples` URLs, each fetched successfully through
/// `fetcher`. URLs that fail to fetch are logged, dropped for the rest of
/// the round and not counted. A cancelled token ends the walk early with
/// whatever was discovered so far.
pub async fn discover<T: Transport>(
    fetcher: &Fetcher<T>,
    seed: &Url,
    max_samples: usize,
    signature: &str,
    cancel: &CancellationToken,
) -> BTreeSet<Url> {
    let mut frontier = FrontierState::new(seed.clone(), max_samples);

    while frontier.has_work() {
        if cancel.is_cancelled() {
            tracing::info!("Discovery from {} cancelled", seed);
            break;
        }

        let Some(current) = frontier.next() else {
            break;
        };

        let body = match fetcher.page(&current).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Dropping {}: {}", current, e);
                continue;
            }
        };

        let related = {
            let document = Html::parse_document(&body);
            extract_related_urls(&document, &current, signature)
        };

        frontier.mark_discovered(current);
        let queued = frontier.enqueue(related);

        tracing::info!(
            "Discovered {}/{} samples ({} queued, {} pending)",
            frontier.discovered().len(),
            max_samples,
            queued,
            frontier.pending()
        );
    }

    frontier.into_discovered()
}
