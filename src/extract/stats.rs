//! Word count and read time

use crate::extract::{clean_text, parse_selector};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// Containers that usually hold the article statistics
pub const STATS_CONTAINERS: &[&str] = &[
    "div.article-stats",
    "div.sample-stats",
    "div.meta-info",
    "div.stats",
    "div.metrics",
];

static WORD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(\d[\d,]*)\s*words?\b",
        r"(?i)words?:\s*(\d[\d,]*)",
        r"(?i)length:\s*(\d[\d,]*)",
    ])
});

static READ_TIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(\d+\s*mins?\s*read)",
        r"(?i)read\s*time:\s*(\d+\s*mins?)",
        r"(?i)reading\s*time:\s*(\d+\s*mins?)",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
}

/// Extracts `(word_count, read_time)` from the first stats container that
/// yields either quantity
///
/// The two quantities are matched independently within that container's
/// text. Returns `(None, None)` when no container yields anything.
pub fn extract_word_count_and_read_time(document: &Html) -> (Option<u32>, Option<String>) {
    for css in STATS_CONTAINERS {
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        let Some(container) = document.select(&selector).next() else {
            continue;
        };

        let text = container.text().collect::<Vec<_>>().join(" ");
        let word_count = extract_word_count(&text);
        let read_time = extract_read_time(&text);

        if word_count.is_some() || read_time.is_some() {
            tracing::trace!("Stats resolved by {}", css);
            return (word_count, read_time);
        }
    }

    (None, None)
}

/// First word-count pattern match in `text`; thousands separators allowed
pub fn extract_word_count(text: &str) -> Option<u32> {
    WORD_PATTERNS.iter().find_map(|pattern| {
        let digits: String = pattern
            .captures(text)?
            .get(1)?
            .as_str()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    })
}

/// First read-time pattern match in `text`, kept as written
pub fn extract_read_time(text: &str) -> Option<String> {
    READ_TIME_PATTERNS.iter().find_map(|pattern| {
        let raw = pattern.captures(text)?.get(1)?.as_str();
        Some(clean_text(raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_patterns() {
        assert_eq!(extract_word_count("2100 words"), Some(2100));
        assert_eq!(extract_word_count("Words: 950"), Some(950));
        assert_eq!(extract_word_count("Length: 1200"), Some(1200));
        assert_eq!(extract_word_count("1,250 Words"), Some(1250));
        assert_eq!(extract_word_count("12 pages"), None);
    }

    #[test]
    fn test_read_time_patterns() {
        assert_eq!(extract_read_time("11 min read"), Some("11 min read".to_string()));
        assert_eq!(extract_read_time("Read time: 7 mins"), Some("7 mins".to_string()));
        assert_eq!(
            extract_read_time("Reading time: 12  min"),
            Some("12 min".to_string())
        );
        assert_eq!(extract_read_time("quick read"), None);
    }

    #[test]
    fn test_stats_from_single_container() {
        let html = Html::parse_document(
            r#"<div class="article-stats"><span>2,100 words</span><span>11 min read</span></div>"#,
        );
        assert_eq!(
            extract_word_count_and_read_time(&html),
            (Some(2100), Some("11 min read".to_string()))
        );
    }

    #[test]
    fn test_quantities_are_independent() {
        let html = Html::parse_document(r#"<div class="stats">Read time: 5 mins</div>"#);
        assert_eq!(
            extract_word_count_and_read_time(&html),
            (None, Some("5 mins".to_string()))
        );
    }

    #[test]
    fn test_container_without_stats_falls_through() {
        let html = Html::parse_document(
            r#"<div class="meta-info">By the editors</div><div class="metrics">Words: 800</div>"#,
        );
        assert_eq!(extract_word_count_and_read_time(&html), (Some(800), None));
    }

    #[test]
    fn test_no_container() {
        let html = Html::parse_document("<p>2000 words, 10 min read</p>");
        assert_eq!(extract_word_count_and_read_time(&html), (None, None));
    }
}
