//! Builds a record from a sample page

use crate::crawler::{Fetcher, Transport};
use crate::extract::{
    extract_description, extract_file_links, extract_publication_date, extract_sections,
    extract_title, extract_word_count_and_read_time,
};
use crate::record::DocumentRecord;
use crate::FetchResult;
use chrono::{DateTime, Utc};
use scraper::Html;
use url::Url;

/// Runs every extractor over `html` and stamps the record with `now`
///
/// Never fails. A page with no recognizable title gets an empty title,
/// which validation then rejects.
pub fn assemble_html(url: &Url, html: &str, subject: &str, now: DateTime<Utc>) -> DocumentRecord {
    let document = Html::parse_document(html);
    let (word_count, read_time) = extract_word_count_and_read_time(&document);

    DocumentRecord {
        url: url.to_string(),
        title: extract_title(&document).unwrap_or_default(),
        subject: subject.to_string(),
        description: extract_description(&document),
        sections: extract_sections(&document),
        word_count,
        read_time,
        file_links: extract_file_links(&document, url),
        publication_date: extract_publication_date(&document),
        last_updated: now,
    }
}

/// Obtains `url` through the round's fetcher and assembles its record
///
/// A page already fetched during discovery is reused without a request,
/// and its retained body is released once taken.
pub async fn assemble<T: Transport>(
    fetcher: &Fetcher<T>,
    url: &Url,
    subject: &str,
) -> FetchResult<DocumentRecord> {
    let html = fetcher.take_page(url).await?;
    let record = assemble_html(url, &html, subject, Utc::now());
    tracing::debug!(
        "Assembled {} ({} of {} sections filled)",
        url,
        record.filled_sections(),
        record.sections.len()
    );
    Ok(record)
}
