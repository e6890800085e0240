//! Attachment links and related sample URLs

use crate::extract::parse_selector;
use scraper::Html;
use std::collections::BTreeSet;
use url::Url;

/// Anchor selectors searched for links to other samples
pub const RELATED_CONTAINERS: &[&str] = &[
    "div.related-samples a",
    "div.similar-content a",
    "div.recommendations a",
    "aside a",
    "nav a",
    "main a",
];

/// Path extensions that mark a link as a downloadable attachment
const ATTACHMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "csv", "zip", "ggb", "txt", "odt", "ods",
];

/// Resolves an href against the page URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links
/// - unparseable URLs
/// - anything that is not HTTP(S) after resolution
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let resolved = base_url.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Absolute attachment URLs in encounter order, duplicates removed
///
/// An anchor counts as an attachment if it carries a `download` attribute
/// or its resolved path ends in a known document extension.
pub fn extract_file_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Some(anchors) = parse_selector("a[href]") else {
        return Vec::new();
    };

    let mut links: Vec<String> = Vec::new();
    for element in document.select(&anchors) {
        let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, base_url))
        else {
            continue;
        };

        let is_download = element.value().attr("download").is_some();
        if !is_download && !has_attachment_extension(&url) {
            continue;
        }

        let link = url.to_string();
        if !links.contains(&link) {
            links.push(link);
        }
    }

    tracing::trace!("Found {} file links on {}", links.len(), base_url);
    links
}

/// Links to other sample pages, resolved and deduplicated
///
/// Only hrefs containing `signature` (the sample path prefix) are kept.
/// URLs ending in `#` are skipped.
pub fn extract_related_urls(document: &Html, base_url: &Url, signature: &str) -> BTreeSet<Url> {
    let mut related = BTreeSet::new();

    for css in RELATED_CONTAINERS {
        let Some(selector) = parse_selector(css) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !href.contains(signature) || href.trim_end().ends_with('#') {
                continue;
            }

            if let Some(url) = resolve_href(href, base_url) {
                if !url.as_str().ends_with('#') {
                    related.insert(url);
                }
            }
        }
    }

    tracing::debug!("Found {} related URLs on {}", related.len(), base_url);
    related
}

fn has_attachment_extension(url: &Url) -> bool {
    let path = url.path();
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            ATTACHMENT_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNATURE: &str = "/ia-sample/ib-math-ai-sl/";

    fn base_url() -> Url {
        Url::parse("https://nailib.com/ia-sample/ib-math-ai-sl/current").unwrap()
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = base_url();
        assert_eq!(
            resolve_href("/files/a.pdf", &base).unwrap().as_str(),
            "https://nailib.com/files/a.pdf"
        );
        assert_eq!(
            resolve_href("other", &base).unwrap().as_str(),
            "https://nailib.com/ia-sample/ib-math-ai-sl/other"
        );
        assert_eq!(
            resolve_href("https://cdn.example.com/x", &base).unwrap().as_str(),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn test_resolve_skips_special_schemes() {
        let base = base_url();
        assert!(resolve_href("javascript:void(0)", &base).is_none());
        assert!(resolve_href("MAILTO:a@b.c", &base).is_none());
        assert!(resolve_href("tel:+123", &base).is_none());
        assert!(resolve_href("data:text/plain,hi", &base).is_none());
        assert!(resolve_href("ftp://host/file.pdf", &base).is_none());
        assert!(resolve_href("#top", &base).is_none());
        assert!(resolve_href("   ", &base).is_none());
    }

    #[test]
    fn test_file_links_by_extension_and_download() {
        let html = Html::parse_document(
            r#"
            <a href="/files/report.PDF">Report</a>
            <a href="/files/data.csv">Data</a>
            <a href="/export?id=4" download>Export</a>
            <a href="/ia-sample/ib-math-ai-sl/next">Next sample</a>
            <a href="/files/report.PDF">Report again</a>
            <a href="/files/model.ggb">Model</a>
            "#,
        );
        assert_eq!(
            extract_file_links(&html, &base_url()),
            vec![
                "https://nailib.com/files/report.PDF",
                "https://nailib.com/files/data.csv",
                "https://nailib.com/export?id=4",
                "https://nailib.com/files/model.ggb",
            ]
        );
    }

    #[test]
    fn test_file_links_ignore_extension_in_query_or_dotfile() {
        let html = Html::parse_document(
            r#"<a href="/view?file=a.pdf">View</a><a href="/files/.txt">Hidden</a>"#,
        );
        assert!(extract_file_links(&html, &base_url()).is_empty());
    }

    #[test]
    fn test_related_urls_filtered_by_signature() {
        let html = Html::parse_document(
            r##"
            <nav><a href="/about">About</a></nav>
            <div class="related-samples">
                <a href="/ia-sample/ib-math-ai-sl/b">B</a>
                <a href="https://nailib.com/ia-sample/ib-math-ai-sl/c">C</a>
                <a href="/ia-sample/ib-math-ai-sl/b">B again</a>
                <a href="/ia-sample/ib-math-ai-sl/d#">Anchor</a>
                <a href="/ia-sample/ib-math-aa-hl/e">Other subject</a>
            </div>
            <main><a href="/ia-sample/ib-math-ai-sl/f?ref=main">F</a></main>
            "##,
        );
        let related: Vec<String> = extract_related_urls(&html, &base_url(), SIGNATURE)
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(
            related,
            vec![
                "https://nailib.com/ia-sample/ib-math-ai-sl/b",
                "https://nailib.com/ia-sample/ib-math-ai-sl/c",
                "https://nailib.com/ia-sample/ib-math-ai-sl/f?ref=main",
            ]
        );
    }

    #[test]
    fn test_related_urls_outside_containers_are_ignored() {
        let html = Html::parse_document(
            r#"<div class="footer"><a href="/ia-sample/ib-math-ai-sl/z">Z</a></div>"#,
        );
        assert!(extract_related_urls(&html, &base_url(), SIGNATURE).is_empty());
    }

    #[test]
    fn test_related_urls_are_absolute() {
        let html = Html::parse_document(r#"<aside><a href="/ia-sample/ib-math-ai-sl/x">X</a></aside>"#);
        for url in extract_related_urls(&html, &base_url(), SIGNATURE) {
            assert!(url.has_host());
            assert!(url.scheme() == "https" || url.scheme() == "http");
        }
    }
}
