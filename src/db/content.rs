//! Content type registry and entry operations.

use crate::importer::ContentStore;
use crate::{Error, Result};
use serde_json::Value;

use super::{ContentType, ContentTypeRow, Database, Entry, EntryRow, NewContentType};

impl Database {
    /// Register a content type, replacing the display name and required
    /// fields if the uid already exists
    pub async fn register_content_type(&self, content_type: &NewContentType) -> Result<()> {
        let required_fields = serde_json::to_string(&content_type.required_fields)?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO content_types (uid, display_name, required_fields, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(uid) DO UPDATE SET
                display_name = excluded.display_name,
                required_fields = excluded.required_fields
            "#,
        )
        .bind(&content_type.uid)
        .bind(&content_type.display_name)
        .bind(required_fields)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        tracing::debug!(uid = %content_type.uid, "registered content type");
        Ok(())
    }

    /// Get a content type by uid
    pub async fn get_content_type(&self, uid: &str) -> Result<Option<ContentType>> {
        let row = sqlx::query_as::<_, ContentTypeRow>(
            "SELECT uid, display_name, required_fields, created_at FROM content_types WHERE uid = ?",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(row.map(ContentType::from))
    }

    /// List all content types ordered by uid
    pub async fn list_content_types(&self) -> Result<Vec<ContentType>> {
        let rows = sqlx::query_as::<_, ContentTypeRow>(
            "SELECT uid, display_name, required_fields, created_at FROM content_types ORDER BY uid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(rows.into_iter().map(ContentType::from).collect())
    }

    /// Create an entry after checking it against its content type
    ///
    /// The payload must be a JSON object carrying every required field with a
    /// non-null value.
    pub async fn insert_entry(&self, content_type_id: &str, data: &Value) -> Result<Entry> {
        let content_type = self
            .get_content_type(content_type_id)
            .await?
            .ok_or_else(|| Error::UnknownContentType(content_type_id.to_string()))?;

        let object = data.as_object().ok_or_else(|| Error::SchemaViolation {
            content_type: content_type.uid.clone(),
            message: "entry data must be a JSON object".to_string(),
        })?;

        if let Some(missing) = content_type
            .required_fields
            .iter()
            .find(|field| object.get(*field).is_none_or(Value::is_null))
        {
            return Err(Error::SchemaViolation {
                content_type: content_type.uid.clone(),
                message: format!("missing required field `{}`", missing),
            });
        }

        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query("INSERT INTO entries (content_type, data, created_at) VALUES (?, ?, ?)")
            .bind(&content_type.uid)
            .bind(serde_json::to_string(data)?)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(Error::Sqlx)?;

        Ok(Entry {
            id: result.last_insert_rowid(),
            content_type: content_type.uid,
            data: data.clone(),
            created_at: super::timestamp(now),
        })
    }

    /// Get an entry by ID
    pub async fn get_entry(&self, id: i64) -> Result<Option<Entry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            "SELECT id, content_type, data, created_at FROM entries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(row.map(Entry::from))
    }

    /// List entries of a content type in insertion order
    pub async fn list_entries(&self, content_type_id: &str) -> Result<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            "SELECT id, content_type, data, created_at FROM entries WHERE content_type = ? ORDER BY id",
        )
        .bind(content_type_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(rows.into_iter().map(Entry::from).collect())
    }

    /// Number of entries of a content type
    pub async fn count_entries(&self, content_type_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE content_type = ?")
            .bind(content_type_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Sqlx)?;

        Ok(count)
    }
}

#[async_trait::async_trait]
impl ContentStore for Database {
    async fn has_content_type(&self, content_type_id: &str) -> Result<bool> {
        Ok(self.get_content_type(content_type_id).await?.is_some())
    }

    async fn create_entry(&self, content_type_id: &str, data: Value) -> Result<Value> {
        let entry = self.insert_entry(content_type_id, &data).await?;
        Ok(serde_json::to_value(entry)?)
    }
}
