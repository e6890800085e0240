//! Schema check applied before a record is handed to storage

use crate::record::{DocumentRecord, SectionKey};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid record URL: {0}")]
    InvalidUrl(String),

    #[error("Missing required section: {0}")]
    MissingSection(SectionKey),

    #[error("Invalid section format: {0}")]
    MalformedSection(SectionKey),

    #[error("Record is not a JSON object")]
    NotAnObject,
}

/// Validates a typed record
///
/// Checks, in order, that `url`, `title` and `subject` are non-empty (the
/// first missing one is reported), that `url` is absolute, and that every
/// one of the six section keys is present. Section content may be empty.
pub fn validate(record: &DocumentRecord) -> Result<(), ValidationError> {
    require_text("url", &record.url)?;
    require_text("title", &record.title)?;
    require_text("subject", &record.subject)?;
    require_absolute(&record.url)?;

    for key in SectionKey::ALL {
        if !record.sections.contains_key(&key) {
            return Err(ValidationError::MissingSection(key));
        }
    }

    Ok(())
}

/// Boolean form of [`validate`], logging the reason on failure
pub fn is_valid(record: &DocumentRecord) -> bool {
    match validate(record) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Rejecting record for {}: {}", record.url, e);
            false
        }
    }
}

/// Validates a record in its stored JSON form
///
/// Applies the same checks as [`validate`] and additionally requires each
/// section to be an object carrying a string `content` field.
pub fn validate_value(value: &Value) -> Result<(), ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

    for field in ["url", "title", "subject"] {
        let text = object.get(field).and_then(Value::as_str).unwrap_or("");
        require_text(field, text)?;
    }
    if let Some(url) = object.get("url").and_then(Value::as_str) {
        require_absolute(url)?;
    }

    let sections = object.get("sections").and_then(Value::as_object);
    for key in SectionKey::ALL {
        let section = sections
            .and_then(|s| s.get(key.as_str()))
            .ok_or(ValidationError::MissingSection(key))?;

        let has_content = section
            .as_object()
            .and_then(|s| s.get("content"))
            .map(Value::is_string)
            .unwrap_or(false);
        if !has_content {
            return Err(ValidationError::MalformedSection(key));
        }
    }

    Ok(())
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn require_absolute(url: &str) -> Result<(), ValidationError> {
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => Ok(()),
        _ => Err(ValidationError::InvalidUrl(url.to_string())),
    }
}
