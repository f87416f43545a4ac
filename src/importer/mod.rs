//! Batch import orchestration.
//!
//! Split into focused submodules:
//! - [`batching`] - Partitioning, per-batch concurrent dispatch, result merging
//! - [`file`] - JSON file and JSON text adapters
//!
//! The per-record pipeline is: resolve images, sanitize, then
//! [`ContentStore::create_entry`]. Any error from any step (or a panic) counts
//! against that one record only.

mod batching;
pub mod file;


pub use file::parse_json_records;

use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::media::{MediaStore, MediaUploader};
use crate::resolver::ObjectImageResolver;
use crate::retriever::ImageRetriever;
use crate::sanitizer::sanitize_record_before_create;
use crate::types::{ImportRequest, ImportResult};
use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Host content store: the schema registry and the entry writer
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Whether `content_type_id` names a schema the store knows
    async fn has_content_type(&self, content_type_id: &str) -> Result<bool>;

    /// Create one entry of `content_type_id` and return it as stored
    async fn create_entry(&self, content_type_id: &str, data: Value) -> Result<Value>;
}

/// Imports JSON records into a content store, materializing image URLs on the way
#[derive(Clone)]
pub struct ContentImporter {
    content_store: Arc<dyn ContentStore>,
    resolver: ObjectImageResolver,
    batch_size: usize,
}

impl ContentImporter {
    /// Build an importer around injected stores
    ///
    /// When `media_store` is `None`, images go straight to the HTTP upload
    /// endpoint (if the fallback is enabled).
    pub fn new(
        config: &Config,
        content_store: Arc<dyn ContentStore>,
        media_store: Option<Arc<dyn MediaStore>>,
    ) -> Result<Self> {
        let retriever = ImageRetriever::new(&config.retrieval)?;
        let uploader = MediaUploader::new(&config.upload, media_store)?;
        Ok(Self {
            content_store,
            resolver: ObjectImageResolver::new(retriever, uploader),
            batch_size: config.import.effective_batch_size(),
        })
    }

    /// Open the SQLite host from `config.persistence` and use it for both stores
    pub async fn open(config: &Config) -> Result<Self> {
        let db = Arc::new(Database::new(&config.persistence).await?);
        Self::from_database(config, db)
    }

    /// Use an already opened [`Database`] for both stores
    pub fn from_database(config: &Config, db: Arc<Database>) -> Result<Self> {
        Self::new(config, db.clone(), Some(db))
    }

    /// Records dispatched concurrently per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Import a request
    pub async fn import(&self, request: ImportRequest) -> Result<ImportResult> {
        self.import_data(&request.content_type_id, request.records)
            .await
    }

    /// Import a raw JSON value, which must be an array of records
    pub async fn import_json(&self, content_type_id: &str, records: Value) -> Result<ImportResult> {
        match records {
            Value::Array(records) => self.import_data(content_type_id, records).await,
            other => Err(Error::NotAnArray(json_kind(&other).to_string())),
        }
    }

    /// Import `records` as entries of `content_type_id`
    ///
    /// Fails fast, before any record is touched, if the content type id is
    /// empty or unknown to the store. Otherwise always returns a result whose
    /// counts add up to `records.len()`, however many records failed.
    pub async fn import_data(
        &self,
        content_type_id: &str,
        records: Vec<Value>,
    ) -> Result<ImportResult> {
        let content_type_id = content_type_id.trim();
        if content_type_id.is_empty() {
            return Err(Error::InvalidInput(
                "content type id is required".to_string(),
            ));
        }
        if !self.content_store.has_content_type(content_type_id).await? {
            return Err(Error::UnknownContentType(content_type_id.to_string()));
        }

        let batches = batching::partition(records, self.batch_size);
        let total_records: usize = batches.iter().map(|(_, batch)| batch.len()).sum();
        let batch_count = batches.len();
        let mut result = ImportResult::new(content_type_id, total_records);

        tracing::info!(
            content_type = %content_type_id,
            total_records,
            batch_size = self.batch_size,
            batches = batch_count,
            "starting import"
        );

        for (number, (offset, batch)) in batches.into_iter().enumerate() {
            tracing::info!(
                content_type = %content_type_id,
                batch = number + 1,
                of = batch_count,
                records = batch.len(),
                "processing batch"
            );
            let outcomes = self.run_batch(content_type_id, offset, batch).await;
            batching::merge_outcomes(&mut result, outcomes);
        }

        tracing::info!(
            content_type = %content_type_id,
            total_records = result.total_records,
            successful = result.successful,
            failed = result.failed,
            "import finished"
        );

        Ok(result)
    }

    /// Run one record through the pipeline, converting errors and panics to a message
    async fn import_record(
        &self,
        content_type_id: &str,
        index: usize,
        record: Value,
    ) -> std::result::Result<(), String> {
        let outcome = AssertUnwindSafe(self.process_record(content_type_id, index, record))
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic.as_ref()),
        };

        tracing::warn!(content_type = %content_type_id, index, error = %failure, "record import failed");
        Err(failure)
    }

    async fn process_record(&self, content_type_id: &str, index: usize, record: Value) -> Result<()> {
        let resolution = self.resolver.resolve(&record).await;
        if resolution.images_resolved + resolution.images_failed > 0 {
            tracing::debug!(
                index,
                images_resolved = resolution.images_resolved,
                images_failed = resolution.images_failed,
                "resolved record images"
            );
        }

        let payload = sanitize_record_before_create(resolution.value);
        self.content_store
            .create_entry(content_type_id, payload)
            .await?;
        Ok(())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("record processing panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("record processing panicked: {}", message)
    } else {
        "record processing panicked".to_string()
    }
}

/// JSON type name used in error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
