//! Core types for catalog-import

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

/// One import call: a target content type and the raw records to write into it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// Content type every record is created as (e.g. "api::article.article")
    pub content_type_id: String,
    /// Records in input order; any JSON shape is accepted
    pub records: Vec<Value>,
}

/// Image bytes fetched from a remote URL, ready to be uploaded
///
/// Lives only for the duration of one image's processing and is never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// Generated, collision-resistant filename including extension
    pub filename: String,
    /// MIME type resolved from the extension
    pub mime_type: String,
    /// Size of `bytes`
    pub size_bytes: u64,
}

impl AssetDescriptor {
    /// Filename without its extension
    pub fn stem(&self) -> &str {
        match self.filename.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.filename,
        }
    }
}

// Keep payload bytes out of log output
impl fmt::Debug for AssetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetDescriptor")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

/// Opaque identifier issued by a media store
///
/// The SQLite host issues integers; remote hosts may answer with either form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaId {
    /// Numeric identifier
    Numeric(i64),
    /// String identifier (UUIDs, document ids)
    Text(String),
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaId::Numeric(id) => write!(f, "{id}"),
            MediaId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for MediaId {
    fn from(id: i64) -> Self {
        MediaId::Numeric(id)
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        MediaId::Text(id.to_string())
    }
}

/// Media record returned by a media store after a successful upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Identifier used in the [`MediaReference`]
    pub id: MediaId,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Public URL of the stored file
    #[serde(default)]
    pub url: Option<String>,
    /// MIME type as recorded by the store
    #[serde(default)]
    pub mime: Option<String>,
    /// Size as reported by the store (some hosts report kilobytes as a float)
    #[serde(default)]
    pub size: Option<f64>,
}

/// Replacement value for a resolved image leaf: `{"connect": [id]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    /// Media ids to link; exactly one for a resolved image
    pub connect: Vec<MediaId>,
}

impl MediaReference {
    /// Reference linking a single media record
    pub fn to_media(id: MediaId) -> Self {
        Self { connect: vec![id] }
    }

    /// JSON form written into the record
    pub fn to_value(&self) -> Value {
        let ids: Vec<Value> = self
            .connect
            .iter()
            .map(|id| match id {
                MediaId::Numeric(n) => Value::from(*n),
                MediaId::Text(s) => Value::from(s.as_str()),
            })
            .collect();
        serde_json::json!({ "connect": ids })
    }
}

/// A record that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecordError {
    /// Zero-based position of the record in the original input
    pub index: usize,
    /// Error message from the failing step
    pub message: String,
}

/// Summary of one import call
///
/// `successful + failed == total_records` and `errors.len() == failed` always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// Content type the records were imported into
    pub content_type_id: String,
    /// Number of records in the input
    pub total_records: usize,
    /// Records persisted
    pub successful: usize,
    /// Records that failed at any step
    pub failed: usize,
    /// One entry per failed record, ordered by input index
    pub errors: Vec<RecordError>,
}

impl ImportResult {
    /// Empty result for `total_records` records not yet processed
    pub fn new(content_type_id: impl Into<String>, total_records: usize) -> Self {
        Self {
            content_type_id: content_type_id.into(),
            total_records,
            successful: 0,
            failed: 0,
            errors: Vec::new(),
        }
    }

    /// Count a persisted record
    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    /// Count a failed record at its original input position
    pub fn record_failure(&mut self, index: usize, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(RecordError {
            index,
            message: message.into(),
        });
    }
}
