//! Title, description and publication date

use crate::extract::{first_match, Locator};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use scraper::Html;

/// Title locators, most specific first
pub const TITLE_CANDIDATES: &[Locator] = &[
    Locator::Text("h1.title"),
    Locator::Text("h1.sample-title"),
    Locator::Text("h1"),
    Locator::Attr("meta[property='og:title']", "content"),
    Locator::Text("title"),
];

/// Description locators, most specific first
pub const DESCRIPTION_CANDIDATES: &[Locator] = &[
    Locator::Text("div.description"),
    Locator::Text("div.summary"),
    Locator::Text("div.overview"),
    Locator::Attr("meta[name='description']", "content"),
    Locator::Attr("meta[property='og:description']", "content"),
];

/// Publication date locators, most specific first
pub const DATE_CANDIDATES: &[Locator] = &[
    Locator::AttrOrText("time", "datetime"),
    Locator::Text("span.date"),
    Locator::Text("div.meta-date"),
    Locator::Attr("meta[property='article:published_time']", "content"),
];

/// Naive datetime layouts accepted after RFC 3339 fails
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn extract_title(document: &Html) -> Option<String> {
    first_match("title", TITLE_CANDIDATES, |locator| locator.locate(document))
}

/// Returns the description, or an empty string when no locator matches
pub fn extract_description(document: &Html) -> String {
    first_match("description", DESCRIPTION_CANDIDATES, |locator| {
        locator.locate(document)
    })
    .unwrap_or_default()
}

/// Returns the first candidate value that parses as an ISO-8601 date
///
/// A locator that matches but holds an unparseable value (e.g. "May 2023")
/// falls through to the next one.
pub fn extract_publication_date(document: &Html) -> Option<DateTime<Utc>> {
    first_match("publication_date", DATE_CANDIDATES, |locator| {
        locator.locate(document).and_then(|raw| parse_date(&raw))
    })
}

/// Parses ISO-8601 dates and datetimes, treating naive values as UTC
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
