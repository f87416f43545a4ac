//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`import`] — The four import entry points
//! - [`system`] — Health, OpenAPI

use crate::types::ImportResult;
use serde::{Deserialize, Serialize};

mod import;
mod system;

pub use import::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /import/:content_type
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ImportDataRequest {
    /// Records to import; must be an array
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub data: serde_json::Value,
}

/// Request body for POST /import-json/:content_type
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportJsonRequest {
    /// JSON text holding an array of records
    #[serde(default)]
    pub json_data: String,
}

/// Request body for POST /import-local-file/:content_type
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportLocalFileRequest {
    /// Path of a JSON file readable by the server
    #[serde(default)]
    pub file_path: String,
}

/// Response for every successful import
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ImportResponse {
    /// Always `true`; failures use the error body instead
    pub success: bool,
    /// Per-import outcome
    pub result: ImportResult,
}

impl From<ImportResult> for ImportResponse {
    fn from(result: ImportResult) -> Self {
        Self {
            success: true,
            result,
        }
    }
}
