//! Text normalization and checklist extraction

use scraper::node::Node;
use scraper::ElementRef;

/// Leading characters that mark a line as a bullet item
const BULLET_MARKERS: &[char] = &[
    '\u{2022}', // bullet
    '\u{25E6}', // white bullet
    '\u{25AA}', // small black square
    '\u{00B7}', // middle dot
    '*',
    '-',
    '\u{2013}', // en dash
    '\u{2014}', // em dash
];

/// Elements that start a new line when rendered
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "ul", "ol", "tr", "table", "blockquote", "pre", "h5", "h6",
];

/// Collapses all runs of whitespace into single spaces and trims the ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pulls bullet items out of a block of text
///
/// Keeps lines whose first non-space character is a bullet or dash, strips
/// that one marker and normalizes the rest. Blank items are dropped;
/// repeated items are kept in encounter order.
pub fn extract_checklist_items(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix(BULLET_MARKERS)?;
            let item = clean_text(rest);
            (!item.is_empty()).then_some(item)
        })
        .collect()
}

/// Renders an element's text with line structure preserved
///
/// Block elements and `<br>` break lines; each `<li>` becomes its own
/// bullet line so list items reach the checklist extractor.
pub(crate) fn line_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_lines(element, &mut out, true);
    out
}

/// Whitespace-normalized text with block boundaries kept as spaces
///
/// Unlike `element.text()`, list items and `<br>`-separated lines do not
/// run into each other.
pub fn block_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_lines(element, &mut out, false);
    clean_text(&out)
}

fn push_lines(element: ElementRef<'_>, out: &mut String, bullets: bool) {
    let name = element.value().name();
    if name == "br" {
        out.push('\n');
        return;
    }

    let is_item = name == "li";
    let is_block = is_item || BLOCK_TAGS.contains(&name);
    if is_item && bullets {
        out.push_str("\n\u{2022} ");
    } else if is_block {
        out.push('\n');
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    push_lines(child, out, bullets);
                }
            }
            _ => {}
        }
    }

    if is_block {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first(html: &Html, css: &str) -> String {
        let selector = Selector::parse(css).unwrap();
        line_text(html.select(&selector).next().unwrap())
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  a \n\n b\t c  "), "a b c");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n "), "");
    }

    #[test]
    fn test_checklist_keeps_bullet_and_dash_lines() {
        let text = "Intro line\n\u{2022} First point\n  - Second   point\nNot a bullet\n* Third";
        assert_eq!(
            extract_checklist_items(text),
            vec!["First point", "Second point", "Third"]
        );
    }

    #[test]
    fn test_checklist_drops_empty_items() {
        assert!(extract_checklist_items("-\n\u{2022}   \n-  ").is_empty());
    }

    #[test]
    fn test_checklist_keeps_duplicates_in_order() {
        let text = "- repeat\n- other\n- repeat";
        assert_eq!(
            extract_checklist_items(text),
            vec!["repeat", "other", "repeat"]
        );
    }

    #[test]
    fn test_checklist_strips_only_one_marker() {
        assert_eq!(extract_checklist_items("- - nested"), vec!["- nested"]);
    }

    #[test]
    fn test_checklist_is_idempotent_on_its_output() {
        let text = "\u{2022} Collect data\n - Plot   the data\n\u{2013} Fit a model\n- - odd";
        let once = extract_checklist_items(text);
        let rendered = once
            .iter()
            .map(|item| format!("\u{2022} {}", item))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_checklist_items(&rendered), once);
    }

    #[test]
    fn test_line_text_renders_list_items_as_bullets() {
        let html = Html::parse_fragment("<ul><li>One</li><li>Two <b>bold</b></li></ul>");
        let rendered = first(&html, "ul");
        assert_eq!(extract_checklist_items(&rendered), vec!["One", "Two bold"]);
    }

    #[test]
    fn test_line_text_breaks_on_br() {
        let html = Html::parse_fragment("<p>- first<br>- second</p>");
        let rendered = first(&html, "p");
        assert_eq!(extract_checklist_items(&rendered), vec!["first", "second"]);
    }

    #[test]
    fn test_block_text_separates_items_and_lines() {
        let html = Html::parse_fragment(
            "<div><ul><li>Collect data</li><li>Fit <b>model</b></li></ul><p>- one<br>- two</p></div>",
        );
        let selector = Selector::parse("div").unwrap();
        let element = html.select(&selector).next().unwrap();
        assert_eq!(block_text(element), "Collect data Fit model - one - two");
    }

    #[test]
    fn test_block_text_keeps_inline_words_whole() {
        let html = Html::parse_fragment("<p>un<b>broken</b> word</p>");
        let selector = Selector::parse("p").unwrap();
        assert_eq!(block_text(html.select(&selector).next().unwrap()), "unbroken word");
    }

    #[test]
    fn test_plain_paragraph_has_no_items() {
        let html = Html::parse_fragment("<p>The range is -5 to 5</p>");
        assert!(extract_checklist_items(&first(&html, "p")).is_empty());
    }
}
