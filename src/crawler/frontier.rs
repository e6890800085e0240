//! Discovery frontier
//!
//! The frontier is plain data threaded through the discovery loop:
//! - `visited`: every URL dequeued so far, fetched or failed
//! - `to_visit`: URLs waiting to be fetched
//! - `discovered`: URLs fetched successfully and counted toward the cap

use std::collections::{BTreeSet, HashSet};
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct FrontierState {
    visited: HashSet<Url>,
    to_visit: BTreeSet<Url>,
    discovered: BTreeSet<Url>,
    max_samples: usize,
}

impl FrontierState {
    /// A frontier holding only `seed`
    pub fn new(seed: Url, max_samples: usize) -> Self {
        let mut to_visit = BTreeSet::new();
        if max_samples > 0 {
            to_visit.insert(seed);
        }
        Self {
            visited: HashSet::new(),
            to_visit,
            discovered: BTreeSet::new(),
            max_samples,
        }
    }

    /// Whether the loop should keep going
    pub fn has_work(&self) -> bool {
        !self.to_visit.is_empty() && !self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.discovered.len() >= self.max_samples
    }

    /// Takes the next URL to fetch and marks it visited
    ///
    /// URLs already discovered are skipped.
    pub fn next(&mut self) -> Option<Url> {
        while let Some(url) = self.to_visit.pop_first() {
            if self.discovered.contains(&url) {
                continue;
            }
            self.visited.insert(url.clone());
            return Some(url);
        }
        None
    }

    /// Records a successful fetch
    pub fn mark_discovered(&mut self, url: Url) {
        self.discovered.insert(url);
    }

    /// Queues related URLs not yet seen, unless the cap is already reached
    ///
    /// Queued URLs may outnumber the remaining slots; the loop stops
    /// fetching once `discovered` is full, so spares only stand in for
    /// URLs that fail. Returns how many were queued.
    pub fn enqueue<I>(&mut self, related: I) -> usize
    where
        I: IntoIterator<Item = Url>,
    {
        if self.is_full() {
            return 0;
        }

        let mut queued = 0;
        for url in related {
            if self.visited.contains(&url) || self.discovered.contains(&url) {
                continue;
            }
            if self.to_visit.insert(url) {
                queued += 1;
            }
        }
        queued
    }

    pub fn discovered(&self) -> &BTreeSet<Url> {
        &self.discovered
    }

    pub fn into_discovered(self) -> BTreeSet<Url> {
        self.discovered
    }

    pub fn pending(&self) -> usize {
        self.to_visit.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://site.test/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_zero_cap_has_no_work() {
        let frontier = FrontierState::new(url("a"), 0);
        assert!(!frontier.has_work());
        assert_eq!(frontier.pending(), 0);
    }

    #[test]
    fn test_enqueue_queues_all_related_below_cap() {
        let mut frontier = FrontierState::new(url("a"), 3);
        let a = frontier.next().unwrap();
        frontier.mark_discovered(a);

        let queued = frontier.enqueue([url("b"), url("c"), url("d")]);
        assert_eq!(queued, 3);
        assert_eq!(frontier.pending(), 3);

        for _ in 0..2 {
            let next = frontier.next().unwrap();
            frontier.mark_discovered(next);
        }
        assert!(frontier.is_full());
        assert!(!frontier.has_work());
        assert_eq!(frontier.pending(), 1);
    }

    #[test]
    fn test_enqueue_at_cap_queues_nothing() {
        let mut frontier = FrontierState::new(url("a"), 1);
        let a = frontier.next().unwrap();
        frontier.mark_discovered(a);

        assert_eq!(frontier.enqueue([url("b")]), 0);
        assert_eq!(frontier.pending(), 0);
    }

    #[test]
    fn test_enqueue_skips_known_urls() {
        let mut frontier = FrontierState::new(url("a"), 10);
        let a = frontier.next().unwrap();
        frontier.mark_discovered(a.clone());

        assert_eq!(frontier.enqueue([a, url("b"), url("b")]), 1);
    }

    #[test]
    fn test_failed_url_is_not_requeued() {
        let mut frontier = FrontierState::new(url("a"), 5);
        let a = frontier.next().unwrap();
        // fetch failed: never marked discovered
        assert_eq!(frontier.enqueue([a]), 0);
        assert!(!frontier.has_work());
        assert!(frontier.discovered().is_empty());
    }

    #[test]
    fn test_full_frontier_stops() {
        let mut frontier = FrontierState::new(url("a"), 1);
        let a = frontier.next().unwrap();
        frontier.mark_discovered(a);
        frontier.enqueue([url("b")]);
        assert!(frontier.is_full());
        assert!(!frontier.has_work());
    }
}
