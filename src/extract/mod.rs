//! Field extractors for sample pages
//!
//! Every field is resolved by a fallback chain: an ordered list of
//! candidate locators tried most-specific first until one yields a value.
//! A chain that runs dry is not an error. Optional fields stay empty and a
//! missing title is left for record validation to reject.
//!
//! Extractors only read the parsed document; none depends on the result of
//! another, so each one can be exercised against a fixed fixture.

mod links;
mod metadata;
mod sections;
mod stats;
mod text;

pub use links::{extract_file_links, extract_related_urls, resolve_href, RELATED_CONTAINERS};
pub use metadata::{
    extract_description, extract_publication_date, extract_title, parse_date,
    DATE_CANDIDATES, DESCRIPTION_CANDIDATES, TITLE_CANDIDATES,
};
pub use sections::{extract_section, extract_sections, find_heading, title_variants};
pub use stats::{extract_read_time, extract_word_count, extract_word_count_and_read_time, STATS_CONTAINERS};
pub use text::{block_text, clean_text, extract_checklist_items};

use scraper::{Html, Selector};
use std::fmt::Debug;

/// Where a candidate value lives in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// Normalized text of the first element matching the selector
    Text(&'static str),
    /// Attribute value of the first element matching the selector
    Attr(&'static str, &'static str),
    /// Attribute value if present, otherwise the element's text
    AttrOrText(&'static str, &'static str),
}

impl Locator {
    /// Resolves this locator against a document
    ///
    /// Only the first matching element is consulted. Returns `None` if
    /// nothing matches or the value is blank after normalization.
    pub fn locate(&self, document: &Html) -> Option<String> {
        let css = match self {
            Self::Text(css) | Self::Attr(css, _) | Self::AttrOrText(css, _) => css,
        };
        let selector = parse_selector(css)?;
        let element = document.select(&selector).next()?;

        let raw = match self {
            Self::Text(_) => block_text(element),
            Self::Attr(_, attr) => element.value().attr(attr)?.to_string(),
            Self::AttrOrText(_, attr) => match element.value().attr(attr) {
                Some(value) if !value.trim().is_empty() => value.to_string(),
                _ => block_text(element),
            },
        };

        let value = clean_text(&raw);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Tries each candidate in order and returns the first hit
pub fn first_match<C, T, F>(field: &str, candidates: &[C], mut attempt: F) -> Option<T>
where
    C: Debug,
    F: FnMut(&C) -> Option<T>,
{
    for candidate in candidates {
        if let Some(value) = attempt(candidate) {
            tracing::trace!("{} resolved by {:?}", field, candidate);
            return Some(value);
        }
    }

    tracing::debug!("No candidate matched for {}", field);
    None
}

/// Parses a CSS selector, logging rather than failing on bad input
pub(crate) fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!("Invalid selector {}: {:?}", css, e);
            None
        }
    }
}
