//! Out-of-process upload against the host's public upload endpoint.

use super::{FileMetadata, StagedFile};
use crate::config::UploadConfig;
use crate::error::{Error, Result};
use crate::types::MediaRecord;
use reqwest::multipart::{Form, Part};

/// Posts staged files as multipart to `{public_url}{upload_path}`
///
/// The request carries a `files` part with the asset bytes and a `fileInfo`
/// JSON part with the [`FileMetadata`]. When a token is available it is sent
/// as `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct HttpUploadTransport {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpUploadTransport {
    /// Build the transport, resolving the bearer token (environment first, then config)
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create HTTP client: {}", e),
                key: Some("upload".to_string()),
            })?;

        Ok(Self {
            client,
            url: config.upload_url(),
            token: config.resolve_token(),
        })
    }

    /// Endpoint this transport posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Upload one staged file
    ///
    /// The endpoint may answer with an array of created files (the first one is
    /// used) or with a single file object.
    pub async fn upload(&self, file: &StagedFile, metadata: &FileMetadata) -> Result<MediaRecord> {
        let bytes = tokio::fs::read(&file.path).await?;
        let part = Part::bytes(bytes)
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new()
            .part("files", part)
            .text("fileInfo", serde_json::to_string(metadata)?);

        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Other(format!(
                "upload endpoint returned status {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response.json().await?;
        parse_upload_response(body)
    }
}

fn parse_upload_response(body: serde_json::Value) -> Result<MediaRecord> {
    let record = match body {
        serde_json::Value::Array(mut files) => {
            if files.is_empty() {
                return Err(Error::Other(
                    "upload endpoint returned no files".to_string(),
                ));
            }
            files.swap_remove(0)
        }
        other => other,
    };
    Ok(serde_json::from_value(record)?)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaId;
    use serde_json::json;

    #[test]
    fn test_parse_array_response_takes_first_file() {
        let record =
            parse_upload_response(json!([{"id": 9, "name": "a"}, {"id": 10, "name": "b"}]))
                .unwrap();
        assert_eq!(record.id, MediaId::Numeric(9));
    }

    #[test]
    fn test_parse_object_response() {
        let record = parse_upload_response(json!({"id": "xyz", "url": "/uploads/a.png"})).unwrap();
        assert_eq!(record.id, MediaId::Text("xyz".into()));
        assert_eq!(record.url.as_deref(), Some("/uploads/a.png"));
    }

    #[test]
    fn test_parse_rejects_empty_array_and_missing_id() {
        assert!(parse_upload_response(json!([])).is_err());
        assert!(parse_upload_response(json!({"name": "no id"})).is_err());
    }

    #[test]
    fn test_url_comes_from_config() {
        let config = UploadConfig {
            public_url: "http://cms.local:1337".into(),
            ..Default::default()
        };
        let transport = HttpUploadTransport::new(&config).unwrap();
        assert_eq!(transport.url(), "http://cms.local:1337/api/upload");
    }
}
