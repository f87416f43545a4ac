//! # catalog-import
//!
//! Bulk importer for JSON records into a content store. String fields that
//! point at images are downloaded, uploaded into a media library, and
//! replaced with `{connect: [id]}` references before each record is created.
//!
//! ## Pipeline
//!
//! For every record: [`resolver`] walks the JSON tree and materializes image
//! URLs, [`sanitizer`] drops malformed media references, then the record is
//! written through [`importer::ContentStore`]. Records are processed in
//! order-preserving batches of at most [`config::MAX_BATCH_SIZE`], with the
//! records of one batch running concurrently. A failing record never stops
//! the others; the outcome is reported in an [`ImportResult`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use catalog_import::{Config, ContentImporter, Database};
//! use catalog_import::db::NewContentType;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let db = Arc::new(Database::new(&config.persistence).await?);
//!     db.register_content_type(&NewContentType {
//!         uid: "api::product.product".to_string(),
//!         display_name: "Product".to_string(),
//!         required_fields: vec!["title".to_string()],
//!     })
//!     .await?;
//!
//!     let importer = ContentImporter::from_database(&config, db)?;
//!     let result = importer
//!         .import_data(
//!             "api::product.product",
//!             vec![json!({"title": "Lamp", "image": "https://example.com/lamp.jpg"})],
//!         )
//!         .await?;
//!
//!     println!("{} imported, {} failed", result.successful, result.failed);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// URL classification
pub mod classifier;
/// Configuration types
pub mod config;
/// SQLite reference host
pub mod db;
/// Error types
pub mod error;
/// Batch import orchestration
pub mod importer;
/// Media library upload with HTTP fallback
pub mod media;
/// Recursive image URL materialization
pub mod resolver;
/// Guarded image download
pub mod retriever;
/// Pre-persistence cleanup of media references
pub mod sanitizer;
/// Core data types
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{
    ApiError, DatabaseError, DownloadFailure, Error, ErrorDetail, Result, ToHttpStatus,
    UploadFailure,
};
pub use importer::{ContentImporter, ContentStore};
pub use media::{MediaStore, MediaUploader};
pub use resolver::ObjectImageResolver;
pub use retriever::ImageRetriever;
pub use types::{
    AssetDescriptor, ImportRequest, ImportResult, MediaId, MediaRecord, MediaReference,
    RecordError,
};
