//! SQLite reference host for catalog-import
//!
//! Implements both [`ContentStore`](crate::importer::ContentStore) and
//! [`MediaStore`](crate::media::MediaStore) so the importer can run without
//! an external CMS.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`content`] — Content type registry and entries
//! - [`media`] — Media library files

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, sqlite::SqlitePool};
use std::path::PathBuf;

mod content;
mod media;
mod migrations;

/// Content type to register with the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContentType {
    /// Unique id, e.g. `api::product.product`
    pub uid: String,
    /// Human readable name
    pub display_name: String,
    /// Top-level fields every entry must carry (non-null)
    #[serde(default)]
    pub required_fields: Vec<String>,
}

/// Content type registered with the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentType {
    /// Unique id
    pub uid: String,
    /// Human readable name
    pub display_name: String,
    /// Top-level fields every entry must carry
    pub required_fields: Vec<String>,
    /// When the content type was registered
    pub created_at: DateTime<Utc>,
}

/// Content type record from database (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ContentTypeRow {
    pub uid: String,
    pub display_name: String,
    /// JSON array of field names
    pub required_fields: String,
    pub created_at: i64,
}

impl From<ContentTypeRow> for ContentType {
    fn from(row: ContentTypeRow) -> Self {
        ContentType {
            uid: row.uid,
            display_name: row.display_name,
            required_fields: serde_json::from_str(&row.required_fields).unwrap_or_default(),
            created_at: timestamp(row.created_at),
        }
    }
}

/// Stored entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Unique database ID
    pub id: i64,
    /// Content type the entry belongs to
    pub content_type: String,
    /// Entry payload
    pub data: Value,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct EntryRow {
    pub id: i64,
    pub content_type: String,
    pub data: String,
    pub created_at: i64,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Entry {
            id: row.id,
            content_type: row.content_type,
            data: serde_json::from_str(&row.data).unwrap_or(Value::Null),
            created_at: timestamp(row.created_at),
        }
    }
}

/// Media file record from database
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MediaFile {
    /// Unique database ID, used in `{connect: [id]}` references
    pub id: i64,
    /// Display name
    pub name: String,
    /// Alternative text
    pub alternative_text: Option<String>,
    /// Caption
    pub caption: Option<String>,
    /// Filename inside the media directory
    pub filename: String,
    /// MIME type
    pub mime: String,
    /// Size in bytes
    pub size: i64,
    /// Public URL
    pub url: String,
    /// Unix timestamp when the file was ingested
    pub created_at: i64,
}

/// Database handle for the reference host
pub struct Database {
    pool: SqlitePool,
    media_dir: PathBuf,
    media_url_prefix: String,
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
