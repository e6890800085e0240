//! Document records
//!
//! A [`DocumentRecord`] is both the unit of extraction and the unit of
//! storage. Records cross the storage boundary as plain JSON values
//! (see [`DocumentRecord::to_value`]) so the store never depends on the
//! in-memory types.

mod assemble;
mod validate;

pub use assemble::{assemble, assemble_html};
pub use validate::{is_valid, validate, validate_value, ValidationError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The six fixed regions of a sample document, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Introduction,
    MathematicalInformation,
    MathematicalProcesses,
    Interpretation,
    ValidityLimitations,
    AcademicHonesty,
}

impl SectionKey {
    pub const ALL: [SectionKey; 6] = [
        SectionKey::Introduction,
        SectionKey::MathematicalInformation,
        SectionKey::MathematicalProcesses,
        SectionKey::Interpretation,
        SectionKey::ValidityLimitations,
        SectionKey::AcademicHonesty,
    ];

    /// Storage key of the section
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::MathematicalInformation => "mathematical_information",
            Self::MathematicalProcesses => "mathematical_processes",
            Self::Interpretation => "interpretation",
            Self::ValidityLimitations => "validity_limitations",
            Self::AcademicHonesty => "academic_honesty",
        }
    }

    /// Heading text the section is published under
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Introduction => "Introduction",
            Self::MathematicalInformation => "Mathematical Information",
            Self::MathematicalProcesses => "Mathematical Processes",
            Self::Interpretation => "Interpretation of Findings",
            Self::ValidityLimitations => "Validity and Limitations",
            Self::AcademicHonesty => "Academic Honesty",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text of one section plus the bullet items found inside it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub content: String,
    pub checklist_items: Vec<String>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.checklist_items.is_empty()
    }
}

/// Section map keyed in document order
pub type Sections = BTreeMap<SectionKey, Section>;

/// One extracted sample document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Absolute page URL; the upsert key
    pub url: String,
    pub title: String,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub sections: Sections,
    pub word_count: Option<u32>,
    /// Kept verbatim ("5 min read"); the site uses no single format
    pub read_time: Option<String>,
    #[serde(default)]
    pub file_links: Vec<String>,
    pub publication_date: Option<DateTime<Utc>>,
    /// When this record was extracted
    pub last_updated: DateTime<Utc>,
}

impl DocumentRecord {
    /// Returns the section for `key`, if present
    pub fn section(&self, key: SectionKey) -> Option<&Section> {
        self.sections.get(&key)
    }

    /// Number of sections with any content
    pub fn filled_sections(&self) -> usize {
        self.sections.values().filter(|s| !s.is_empty()).count()
    }

    /// Serializes the record into the layout-agnostic form handed to storage
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Rebuilds a record from its stored form
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// A section map with all six keys present and empty
pub fn empty_sections() -> Sections {
    SectionKey::ALL
        .iter()
        .map(|key| (*key, Section::default()))
        .collect()
}
