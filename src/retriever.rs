//! Image retrieval with size, time, and content-type guards.
//!
//! [`ImageRetriever::download_image`] is the only entry point. It never
//! retries: a failed download is terminal for that one image, and the caller
//! keeps the original field value.

use crate::config::RetrievalConfig;
use crate::error::{DownloadFailure, Error, Result};
use crate::types::AssetDescriptor;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Extension used when the URL path has none
const DEFAULT_EXTENSION: &str = ".jpg";

/// MIME type used when the extension is not recognized
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Downloads remote images into [`AssetDescriptor`]s
#[derive(Clone)]
pub struct ImageRetriever {
    client: reqwest::Client,
    max_bytes: u64,
    timeout: Duration,
}

impl ImageRetriever {
    /// Build a retriever from the retrieval settings
    pub fn new(config: &RetrievalConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create HTTP client: {}", e),
                key: Some("retrieval".to_string()),
            })?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
            timeout: config.timeout,
        })
    }

    /// Fetch `url` and describe it as an uploadable asset
    ///
    /// Every rejection is logged at warn level and returned as a
    /// [`DownloadFailure`]; nothing here panics or propagates further.
    pub async fn download_image(
        &self,
        url: &str,
    ) -> std::result::Result<AssetDescriptor, DownloadFailure> {
        match self.fetch(url).await {
            Ok(asset) => {
                tracing::debug!(
                    url = %url,
                    filename = %asset.filename,
                    size_bytes = asset.size_bytes,
                    "image downloaded"
                );
                Ok(asset)
            }
            Err(failure) => {
                tracing::warn!(url = %url, error = %failure, "image download failed");
                Err(failure)
            }
        }
    }

    async fn fetch(&self, url: &str) -> std::result::Result<AssetDescriptor, DownloadFailure> {
        let parsed = Url::parse(url).map_err(|e| DownloadFailure::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        if response.status() != StatusCode::OK {
            return Err(DownloadFailure::HttpStatus {
                status: response.status().as_u16(),
            });
        }

        // An absent Content-Type is tolerated; a non-image one is not
        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default().trim();
            if !content_type.to_ascii_lowercase().starts_with("image/") {
                return Err(DownloadFailure::NotAnImage(content_type.to_string()));
            }
        }

        if let Some(declared) = response.content_length()
            && declared > self.max_bytes
        {
            return Err(DownloadFailure::TooLarge {
                limit: self.max_bytes,
            });
        }

        // Stream the body so an undeclared oversized response is cut off early
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_failure(e))?
        {
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(DownloadFailure::TooLarge {
                    limit: self.max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(DownloadFailure::EmptyBody);
        }

        let extension = extension_from_path(parsed.path());
        let filename = format!("{:032x}{}", rand::random::<u128>(), extension);
        let mime_type = mime_type_for_extension(&extension).to_string();
        let size_bytes = bytes.len() as u64;

        Ok(AssetDescriptor {
            bytes,
            filename,
            mime_type,
            size_bytes,
        })
    }

    fn transport_failure(&self, error: reqwest::Error) -> DownloadFailure {
        if error.is_timeout() {
            DownloadFailure::Timeout(self.timeout)
        } else {
            DownloadFailure::Transport(error.to_string())
        }
    }
}

/// Dot-prefixed lowercase extension of a URL path, or `.jpg`
pub(crate) fn extension_from_path(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// MIME type for a dot-prefixed extension, or `image/jpeg`
pub(crate) fn mime_type_for_extension(extension: &str) -> &'static str {
    match extension.trim_start_matches('.') {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        _ => DEFAULT_MIME_TYPE,
    }
}
