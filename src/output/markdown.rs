//! Markdown catalog generation
//!
//! This module generates a human-readable markdown catalog of stored
//! samples, including overview statistics and one entry per sample.

use crate::output::traits::{CatalogSummary, OutputResult};
use crate::record::{DocumentRecord, SectionKey};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown catalog for `summary` to `output_path`
pub fn generate_markdown_summary(summary: &CatalogSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a catalog summary as markdown
pub fn format_markdown_summary(summary: &CatalogSummary) -> String {
    let mut md = String::new();

    md.push_str("# Sample Catalog\n\n");
    md.push_str(&format!(
        "Generated {}\n\n",
        summary.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    // Overview
    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Stored Samples**: {}\n", summary.stats.count));
    md.push_str(&format!(
        "- **Subjects**: {}\n",
        if summary.stats.subjects.is_empty() {
            "none".to_string()
        } else {
            summary.stats.subjects.join(", ")
        }
    ));
    if let Some(updated) = summary.stats.latest_update {
        md.push_str(&format!("- **Last Updated**: {}\n", updated.to_rfc3339()));
    }
    if let Some(average) = summary.average_word_count() {
        md.push_str(&format!("- **Average Word Count**: {:.0}\n", average));
    }
    md.push_str(&format!(
        "- **Checklist Items**: {}\n",
        summary.total_checklist_items()
    ));
    md.push_str(&format!(
        "- **Attachments**: {}\n",
        summary.total_attachments()
    ));
    if summary.unreadable > 0 {
        md.push_str(&format!(
            "- **Unreadable Documents**: {}\n",
            summary.unreadable
        ));
    }
    md.push('\n');

    if let Some(run) = &summary.latest_run {
        md.push_str("## Latest Round\n\n");
        md.push_str(&format!("- **Run ID**: {}\n", run.id));
        md.push_str(&format!("- **Started**: {}\n", run.started_at));
        if let Some(finished) = &run.finished_at {
            md.push_str(&format!("- **Finished**: {}\n", finished));
        }
        md.push_str(&format!(
            "- **Stored**: {} / {}\n",
            run.stored, run.attempted
        ));
        md.push_str(&format!("- **Config Hash**: {}\n\n", run.config_hash));
    }

    // Section coverage
    if !summary.samples.is_empty() {
        md.push_str("## Section Coverage\n\n");
        md.push_str("| Section | Samples |\n");
        md.push_str("|---------|---------|\n");
        for key in SectionKey::ALL {
            let filled = summary
                .samples
                .iter()
                .filter(|s| s.section(key).map_or(false, |sec| !sec.is_empty()))
                .count();
            md.push_str(&format!("| {} | {} |\n", key.heading(), filled));
        }
        md.push('\n');
    }

    md.push_str("## Samples\n\n");
    if summary.samples.is_empty() {
        md.push_str("No samples stored yet.\n");
    }
    for sample in &summary.samples {
        push_sample(&mut md, sample);
    }

    md
}

fn push_sample(md: &mut String, sample: &DocumentRecord) {
    md.push_str(&format!("### [{}]({})\n\n", sample.title, sample.url));
    if !sample.description.is_empty() {
        md.push_str(&format!("{}\n\n", sample.description));
    }

    md.push_str(&format!("- **Subject**: {}\n", sample.subject));
    if let Some(words) = sample.word_count {
        md.push_str(&format!("- **Word Count**: {}\n", words));
    }
    if let Some(read_time) = &sample.read_time {
        md.push_str(&format!("- **Read Time**: {}\n", read_time));
    }
    if let Some(published) = sample.publication_date {
        md.push_str(&format!("- **Published**: {}\n", published.format("%Y-%m-%d")));
    }

    let present: Vec<&str> = sample
        .sections
        .iter()
        .filter(|(_, section)| !section.is_empty())
        .map(|(key, _)| key.heading())
        .collect();
    md.push_str(&format!(
        "- **Sections**: {} of {}{}\n",
        present.len(),
        SectionKey::ALL.len(),
        if present.is_empty() {
            String::new()
        } else {
            format!(" ({})", present.join(", "))
        }
    ));

    let checklist: usize = sample
        .sections
        .values()
        .map(|s| s.checklist_items.len())
        .sum();
    md.push_str(&format!("- **Checklist Items**: {}\n", checklist));

    if !sample.file_links.is_empty() {
        md.push_str("- **Attachments**:\n");
        for link in &sample.file_links {
            md.push_str(&format!("  - {}\n", link));
        }
    }
    md.push('\n');
}
