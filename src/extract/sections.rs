//! Section content delimited by headings

use crate::extract::text::{block_text, line_text};
use crate::extract::extract_checklist_items;
use crate::record::{Section, SectionKey, Sections};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4"];

static HEADINGS: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("h1, h2, h3, h4").ok());

/// Spellings a section title is searched under, duplicates removed
pub fn title_variants(title: &str) -> Vec<String> {
    let lower = title.to_lowercase();
    let mut variants = Vec::with_capacity(4);
    for variant in [
        title.to_string(),
        lower.clone(),
        lower.replace(' ', "-"),
        lower.replace(' ', "_"),
    ] {
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

/// First h1-h4 whose text contains `variant`, ignoring case
pub fn find_heading<'a>(document: &'a Html, variant: &str) -> Option<ElementRef<'a>> {
    let headings = HEADINGS.as_ref()?;
    let needle = variant.to_lowercase();
    document
        .select(headings)
        .find(|heading| block_text(*heading).to_lowercase().contains(&needle))
}

/// Extracts the section published under `title`
///
/// Walks the sibling elements after the matching heading up to the next
/// h1-h4. An absent heading gives an empty section.
pub fn extract_section(document: &Html, title: &str) -> Section {
    for variant in title_variants(title) {
        if let Some(heading) = find_heading(document, &variant) {
            tracing::trace!("Section '{}' matched heading variant '{}'", title, variant);
            return section_after(heading);
        }
    }

    tracing::debug!("No heading found for section '{}'", title);
    Section::default()
}

/// Extracts all six fixed sections; every key is always present
pub fn extract_sections(document: &Html) -> Sections {
    SectionKey::ALL
        .iter()
        .map(|key| (*key, extract_section(document, key.heading())))
        .collect()
}

fn section_after(heading: ElementRef<'_>) -> Section {
    let mut content = Vec::new();
    let mut checklist_items = Vec::new();

    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        if is_heading(sibling) {
            break;
        }

        let text = block_text(sibling);
        if text.is_empty() {
            continue;
        }
        content.push(text);
        checklist_items.extend(extract_checklist_items(&line_text(sibling)));
    }

    Section {
        content: content.join(" "),
        checklist_items,
    }
}

fn is_heading(element: ElementRef<'_>) -> bool {
    HEADING_TAGS.contains(&element.value().name())
}
