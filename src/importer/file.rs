//! JSON file and JSON text adapters for the importer.

use super::{ContentImporter, json_kind};
use crate::error::{Error, Result};
use crate::types::ImportResult;
use serde_json::Value;
use std::path::Path;

/// Parse `text` as a JSON array of records
///
/// Returns [`Error::InvalidJson`] for unparsable input and
/// [`Error::NotAnArray`] when the top-level value is not an array.
pub fn parse_json_records(text: &str) -> Result<Vec<Value>> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| Error::InvalidJson(e.to_string()))?;
    match value {
        Value::Array(records) => Ok(records),
        other => Err(Error::NotAnArray(json_kind(&other).to_string())),
    }
}

impl ContentImporter {
    /// Read a JSON array of records from `path` and import it
    ///
    /// A missing file, unparsable or non-UTF-8 JSON, and a non-array document
    /// each produce a distinct error; everything else behaves like
    /// [`import_data`](ContentImporter::import_data).
    pub async fn import_from_file(
        &self,
        content_type_id: &str,
        path: impl AsRef<Path>,
    ) -> Result<ImportResult> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(Error::Io(e)),
        };
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::InvalidJson(format!("{}: {}", path.display(), e)))?;

        let records = parse_json_records(&text).map_err(|e| match e {
            Error::InvalidJson(reason) => {
                Error::InvalidJson(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;

        tracing::info!(path = %path.display(), records = records.len(), "read import file");
        self.import_data(content_type_id, records).await
    }
}
