//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the DocumentStore
//! trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    DocumentFilter, DocumentStore, RunRecord, StorageError, StorageResult, StoreStats,
    UpsertOutcome,
};
use crate::ScraperError;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;

/// Columns pulled out of a document for indexing and search
struct IndexedFields<'a> {
    url: &'a str,
    title: &'a str,
    subject: &'a str,
    description: &'a str,
    introduction: &'a str,
    last_updated: String,
}

impl<'a> IndexedFields<'a> {
    fn from_document(document: &'a Value) -> StorageResult<Self> {
        let object = document
            .as_object()
            .ok_or_else(|| StorageError::InvalidDocument("not a JSON object".to_string()))?;

        let url = text(object, "url");
        if url.trim().is_empty() {
            return Err(StorageError::InvalidDocument("missing url".to_string()));
        }

        let introduction = document
            .pointer("/sections/introduction/content")
            .and_then(Value::as_str)
            .unwrap_or("");

        let last_updated = object
            .get("last_updated")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(Self {
            url,
            title: text(object, "title"),
            subject: text(object, "subject"),
            description: text(object, "description"),
            introduction,
            last_updated: timestamp(&last_updated),
        })
    }
}

fn text<'v>(object: &'v Map<String, Value>, field: &str) -> &'v str {
    object.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Fixed-width UTC timestamp so column order matches time order
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Escapes LIKE wildcards in user search text
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// SQLite document store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> Result<Self, ScraperError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        tracing::debug!("Opened document store at {}", path.display());

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, ScraperError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn parse_body(body: String) -> StorageResult<Value> {
        Ok(serde_json::from_str(&body)?)
    }
}

impl DocumentStore for SqliteStore {
    // ===== Documents =====

    fn upsert(&mut self, document: &Value) -> StorageResult<UpsertOutcome> {
        let fields = IndexedFields::from_document(document)?;
        let body = serde_json::to_string(document)?;

        let tx = self.conn.transaction()?;
        let exists = tx
            .query_row(
                "SELECT 1 FROM documents WHERE url = ?1",
                params![fields.url],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        tx.execute(
            "INSERT INTO documents (url, title, subject, description, introduction, last_updated, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                subject = excluded.subject,
                description = excluded.description,
                introduction = excluded.introduction,
                last_updated = excluded.last_updated,
                body = excluded.body",
            params![
                fields.url,
                fields.title,
                fields.subject,
                fields.description,
                fields.introduction,
                fields.last_updated,
                body
            ],
        )?;
        tx.commit()?;

        let outcome = if exists {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        };
        tracing::debug!("Upserted {} ({:?})", fields.url, outcome);
        Ok(outcome)
    }

    fn query(&self, filter: &DocumentFilter, skip: usize, limit: usize) -> StorageResult<Vec<Value>> {
        let pattern = filter
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(like_pattern);

        let mut stmt = self.conn.prepare(
            "SELECT body FROM documents
             WHERE (?1 IS NULL OR subject = ?1)
               AND (?2 IS NULL
                    OR title LIKE ?2 ESCAPE '\\'
                    OR description LIKE ?2 ESCAPE '\\'
                    OR introduction LIKE ?2 ESCAPE '\\')
             ORDER BY last_updated DESC, url ASC
             LIMIT ?3 OFFSET ?4",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let skip = i64::try_from(skip).unwrap_or(i64::MAX);
        let bodies = stmt
            .query_map(params![filter.subject, pattern, limit, skip], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        bodies.into_iter().map(Self::parse_body).collect()
    }

    fn get_by_key(&self, url: &str) -> StorageResult<Option<Value>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE url = ?1",
                params![url],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        body.map(Self::parse_body).transpose()
    }

    fn stats(&self) -> StorageResult<StoreStats> {
        let (count, latest): (i64, Option<String>) = self.conn.query_row(
            "SELECT COUNT(*), MAX(last_updated) FROM documents",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT subject FROM documents ORDER BY subject")?;
        let subjects = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let latest_update = latest
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(StoreStats {
            count: count as u64,
            subjects,
            latest_update,
        })
    }

    // ===== Run Tracking =====

    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash) VALUES (?1, ?2)",
            params![timestamp(&Utc::now()), config_hash],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, attempted: usize, stored: usize) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE runs SET finished_at = ?1, attempted = ?2, stored = ?3 WHERE id = ?4",
            params![
                timestamp(&Utc::now()),
                attempted as i64,
                stored as i64,
                run_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, attempted, stored
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        attempted: row.get::<_, i64>(4)? as u64,
                        stored: row.get::<_, i64>(5)? as u64,
                    })
                },
            )
            .optional()?;

        Ok(run)
    }
}
