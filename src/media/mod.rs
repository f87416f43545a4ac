//! Media library upload with a primary store and an HTTP fallback transport.
//!
//! [`MediaUploader::upload`] stages the asset bytes in a temporary file, hands
//! that file to the primary [`MediaStore`], and if the store is missing or
//! fails, posts the same file once to the host's public upload endpoint via
//! [`fallback::HttpUploadTransport`]. The staged file is removed before
//! `upload` returns, whatever the outcome.

pub mod fallback;

use crate::config::UploadConfig;
use crate::error::{Result, UploadFailure};
use crate::types::{AssetDescriptor, MediaRecord};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use fallback::HttpUploadTransport;

/// Asset bytes staged on disk for an upload transport
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Location of the staged bytes; valid only while the upload is running
    pub path: PathBuf,
    /// Filename the asset should be stored under
    pub filename: String,
    /// MIME type of the asset
    pub mime_type: String,
    /// Size of the staged file in bytes
    pub size_bytes: u64,
}

/// Descriptive metadata attached to an uploaded asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Display name
    pub name: String,
    /// Alternative text for accessibility
    pub alternative_text: String,
    /// Caption
    pub caption: String,
}

impl FileMetadata {
    /// Metadata from a caption hint, or from the asset filename without extension
    pub fn for_asset(asset: &AssetDescriptor, caption_hint: Option<&str>) -> Self {
        let label = caption_hint
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
            .unwrap_or_else(|| asset.stem())
            .to_string();
        Self {
            name: label.clone(),
            alternative_text: label.clone(),
            caption: label,
        }
    }
}

/// Host media library: ingests a staged file and returns the stored record
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `file` with `metadata` and return the record the host created
    async fn ingest(&self, file: &StagedFile, metadata: &FileMetadata) -> Result<MediaRecord>;
}

/// Uploads [`AssetDescriptor`]s into the media library
#[derive(Clone)]
pub struct MediaUploader {
    primary: Option<Arc<dyn MediaStore>>,
    fallback: Option<HttpUploadTransport>,
    temp_dir: PathBuf,
}

impl MediaUploader {
    /// Build an uploader; the fallback transport is created when enabled in `config`
    pub fn new(config: &UploadConfig, primary: Option<Arc<dyn MediaStore>>) -> Result<Self> {
        let fallback = if config.fallback_enabled {
            Some(HttpUploadTransport::new(config)?)
        } else {
            None
        };

        Ok(Self {
            primary,
            fallback,
            temp_dir: config.temp_dir.clone(),
        })
    }

    /// Upload `asset`, using `caption_hint` for name/alt/caption when given
    pub async fn upload(
        &self,
        asset: &AssetDescriptor,
        caption_hint: Option<&str>,
    ) -> std::result::Result<MediaRecord, UploadFailure> {
        if let Err(failure) = validate_asset(asset) {
            tracing::warn!(filename = %asset.filename, error = %failure, "refusing to upload asset");
            return Err(failure);
        }

        let metadata = FileMetadata::for_asset(asset, caption_hint);
        let staged = stage_asset(&self.temp_dir, asset).await.map_err(|e| {
            tracing::warn!(filename = %asset.filename, error = %e, "failed to stage asset");
            UploadFailure::Staging(e.to_string())
        })?;

        let file = StagedFile {
            path: staged.path().to_path_buf(),
            filename: asset.filename.clone(),
            mime_type: asset.mime_type.clone(),
            size_bytes: asset.size_bytes,
        };

        let outcome = self.upload_staged(&file, &metadata).await;

        if let Err(e) = staged.close() {
            tracing::warn!(path = %file.path.display(), error = %e, "failed to remove staged asset");
        }

        outcome
    }

    async fn upload_staged(
        &self,
        file: &StagedFile,
        metadata: &FileMetadata,
    ) -> std::result::Result<MediaRecord, UploadFailure> {
        let primary_error = match &self.primary {
            Some(store) => match store.ingest(file, metadata).await {
                Ok(record) => {
                    tracing::debug!(filename = %file.filename, media_id = %record.id, "asset stored in media library");
                    return Ok(record);
                }
                Err(e) => e.to_string(),
            },
            None => "no media store configured".to_string(),
        };

        let Some(fallback) = &self.fallback else {
            tracing::warn!(filename = %file.filename, error = %primary_error, "media upload failed");
            return Err(UploadFailure::Primary(primary_error));
        };

        tracing::warn!(
            filename = %file.filename,
            error = %primary_error,
            "media store upload failed, trying HTTP upload endpoint"
        );

        match fallback.upload(file, metadata).await {
            Ok(record) => {
                tracing::debug!(filename = %file.filename, media_id = %record.id, "asset uploaded via HTTP endpoint");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(filename = %file.filename, error = %e, "HTTP upload failed");
                Err(UploadFailure::Fallback(e.to_string()))
            }
        }
    }
}

fn validate_asset(asset: &AssetDescriptor) -> std::result::Result<(), UploadFailure> {
    if asset.filename.trim().is_empty() {
        return Err(UploadFailure::InvalidAsset("missing filename".to_string()));
    }
    if asset.mime_type.trim().is_empty() {
        return Err(UploadFailure::InvalidAsset("missing MIME type".to_string()));
    }
    if asset.bytes.is_empty() {
        return Err(UploadFailure::InvalidAsset("empty payload".to_string()));
    }
    Ok(())
}

/// Write the asset bytes to a fresh temporary file under `temp_dir`
///
/// File creation and the write run on the blocking pool.
async fn stage_asset(
    temp_dir: &Path,
    asset: &AssetDescriptor,
) -> std::io::Result<tempfile::NamedTempFile> {
    tokio::fs::create_dir_all(temp_dir).await?;
    let suffix = asset
        .filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{ext}"))
        .unwrap_or_default();
    let temp_dir = temp_dir.to_path_buf();
    let bytes = asset.bytes.clone();

    tokio::task::spawn_blocking(move || {
        let mut staged = tempfile::Builder::new()
            .prefix("catalog-import-")
            .suffix(&suffix)
            .tempfile_in(&temp_dir)?;
        staged.write_all(&bytes)?;
        staged.flush()?;
        Ok::<_, std::io::Error>(staged)
    })
    .await
    .map_err(std::io::Error::other)?
}
