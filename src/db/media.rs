//! Media library files.

use crate::media::{FileMetadata, MediaStore, StagedFile};
use crate::types::{MediaId, MediaRecord};
use crate::{Error, Result};

use super::{Database, MediaFile};

impl Database {
    /// Copy a staged file into the media directory and record it
    ///
    /// The stored filename is prefixed with a timestamp when a file with the
    /// same name already exists.
    pub async fn ingest_file(&self, file: &StagedFile, metadata: &FileMetadata) -> Result<MediaFile> {
        let mut filename = file.filename.clone();
        if tokio::fs::try_exists(self.media_dir.join(&filename)).await? {
            filename = format!(
                "{}_{}",
                chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
                filename
            );
        }

        let destination = self.media_dir.join(&filename);
        let size = tokio::fs::copy(&file.path, &destination).await?;
        let url = format!(
            "{}/{}",
            self.media_url_prefix.trim_end_matches('/'),
            filename
        );
        let now = chrono::Utc::now().timestamp();

        let inserted = sqlx::query(
            r#"
            INSERT INTO media_files (
                name, alternative_text, caption, filename, mime, size, url, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&metadata.name)
        .bind(&metadata.alternative_text)
        .bind(&metadata.caption)
        .bind(&filename)
        .bind(&file.mime_type)
        .bind(size as i64)
        .bind(&url)
        .bind(now)
        .execute(&self.pool)
        .await;

        let result = match inserted {
            Ok(result) => result,
            Err(e) => {
                // Don't leave an orphaned copy behind
                let _ = tokio::fs::remove_file(&destination).await;
                return Err(Error::Sqlx(e));
            }
        };

        tracing::debug!(filename = %filename, size, "ingested media file");

        Ok(MediaFile {
            id: result.last_insert_rowid(),
            name: metadata.name.clone(),
            alternative_text: Some(metadata.alternative_text.clone()),
            caption: Some(metadata.caption.clone()),
            filename,
            mime: file.mime_type.clone(),
            size: size as i64,
            url,
            created_at: now,
        })
    }

    /// Get a media file by ID
    pub async fn get_media(&self, id: i64) -> Result<Option<MediaFile>> {
        let media = sqlx::query_as::<_, MediaFile>(
            r#"
            SELECT id, name, alternative_text, caption, filename, mime, size, url, created_at
            FROM media_files
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(media)
    }

    /// List media files in ingestion order
    pub async fn list_media(&self) -> Result<Vec<MediaFile>> {
        let media = sqlx::query_as::<_, MediaFile>(
            r#"
            SELECT id, name, alternative_text, caption, filename, mime, size, url, created_at
            FROM media_files
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(media)
    }
}

#[async_trait::async_trait]
impl MediaStore for Database {
    async fn ingest(&self, file: &StagedFile, metadata: &FileMetadata) -> Result<MediaRecord> {
        let media = self.ingest_file(file, metadata).await?;
        Ok(MediaRecord {
            id: MediaId::Numeric(media.id),
            name: Some(media.name),
            url: Some(media.url),
            mime: Some(media.mime),
            size: Some(media.size as f64),
        })
    }
}
