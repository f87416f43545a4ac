//! Configuration types for catalog-import
//!
//! Every field has a serde default, so an empty JSON/TOML document (or
//! [`Config::default`]) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Hard ceiling on the number of records processed concurrently in one batch
pub const MAX_BATCH_SIZE: usize = 50;

/// Main configuration for [`crate::ContentImporter`]
///
/// Fields are organized into logical sub-configs:
/// - [`import`](ImportConfig) — batching
/// - [`retrieval`](RetrievalConfig) — image download guards
/// - [`upload`](UploadConfig) — media library upload and its HTTP fallback
/// - [`persistence`](PersistenceConfig) — SQLite reference host
/// - [`server`](ServerIntegrationConfig) — REST API
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Batch import behavior
    #[serde(default)]
    pub import: ImportConfig,

    /// Image retrieval guards
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Media upload settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// Data storage for the SQLite host
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// API server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

/// Batch import behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Records dispatched concurrently per batch (default: 50, max: 50)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

impl ImportConfig {
    /// Batch size actually used, clamped to `1..=MAX_BATCH_SIZE`
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }
}

/// Image retrieval guards
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum accepted image size in bytes (default: 10 MiB)
    #[serde(default = "default_max_image_bytes")]
    pub max_bytes: u64,

    /// Per-request timeout (default: 15 seconds)
    #[serde(default = "default_retrieval_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with image requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_image_bytes(),
            timeout: default_retrieval_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Media upload settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory for staged asset files (default: system temp dir)
    #[serde(default = "std::env::temp_dir")]
    pub temp_dir: PathBuf,

    /// Public base URL of the host, used by the fallback transport
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Upload endpoint path appended to `public_url` (default: "/api/upload")
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Bearer token for the fallback transport (used when the env var is unset)
    #[serde(default)]
    pub token: Option<String>,

    /// Environment variable consulted first for the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Timeout for one fallback upload request (default: 30 seconds)
    #[serde(default = "default_upload_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Whether to try the HTTP fallback when the primary store fails (default: true)
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            public_url: default_public_url(),
            upload_path: default_upload_path(),
            token: None,
            token_env: default_token_env(),
            timeout: default_upload_timeout(),
            fallback_enabled: true,
        }
    }
}

impl UploadConfig {
    /// Full URL of the fallback upload endpoint
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}",
            self.public_url.trim_end_matches('/'),
            self.upload_path.trim_start_matches('/')
        )
    }

    /// Resolve the fallback bearer token: environment first, then configuration
    pub fn resolve_token(&self) -> Option<String> {
        select_token(std::env::var(&self.token_env).ok(), self.token.as_deref())
    }
}

/// Pick the first non-empty token, environment value taking priority
pub(crate) fn select_token(env_value: Option<String>, configured: Option<&str>) -> Option<String> {
    env_value
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            configured
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string)
        })
}

/// Data storage for the SQLite reference host
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path to the SQLite database (default: "catalog-import.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory where ingested media files are stored (default: "uploads")
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// URL prefix recorded for ingested media (default: "/uploads")
    #[serde(default = "default_media_url_prefix")]
    pub media_url_prefix: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            media_dir: default_media_dir(),
            media_url_prefix: default_media_url_prefix(),
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6790)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Maximum request body size in bytes (default: 50 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_max_image_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_retrieval_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_user_agent() -> String {
    format!("catalog-import/{}", env!("CARGO_PKG_VERSION"))
}

fn default_public_url() -> String {
    "http://localhost:1337".to_string()
}

fn default_upload_path() -> String {
    "/api/upload".to_string()
}

fn default_token_env() -> String {
    "MEDIA_UPLOAD_TOKEN".to_string()
}

fn default_upload_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_database_path() -> PathBuf {
    PathBuf::from("catalog-import.db")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_media_url_prefix() -> String {
    "/uploads".to_string()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6790))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.import.batch_size, 50);
        assert_eq!(config.retrieval.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.retrieval.timeout, Duration::from_secs(15));
        assert_eq!(config.upload.token_env, "MEDIA_UPLOAD_TOKEN");
        assert!(config.upload.fallback_enabled);
        assert_eq!(config.server.api.bind_address.port(), 6790);
    }

    #[test]
    fn test_empty_document_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.import.batch_size, 50);
        assert_eq!(config.upload.upload_path, "/api/upload");
        assert_eq!(config.persistence.media_url_prefix, "/uploads");
    }

    #[test]
    fn test_durations_deserialize_from_seconds() {
        let config: Config =
            serde_json::from_str(r#"{"retrieval": {"timeout": 3}, "upload": {"timeout": 7}}"#)
                .unwrap();
        assert_eq!(config.retrieval.timeout, Duration::from_secs(3));
        assert_eq!(config.upload.timeout, Duration::from_secs(7));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["retrieval"]["timeout"], 3);
    }

    #[test]
    fn test_effective_batch_size_is_clamped() {
        let mut import = ImportConfig::default();
        import.batch_size = 0;
        assert_eq!(import.effective_batch_size(), 1);
        import.batch_size = 500;
        assert_eq!(import.effective_batch_size(), MAX_BATCH_SIZE);
        import.batch_size = 7;
        assert_eq!(import.effective_batch_size(), 7);
    }

    #[test]
    fn test_upload_url_joins_without_double_slash() {
        let mut upload = UploadConfig::default();
        assert_eq!(upload.upload_url(), "http://localhost:1337/api/upload");
        upload.public_url = "https://cms.example.com/".into();
        upload.upload_path = "upload".into();
        assert_eq!(upload.upload_url(), "https://cms.example.com/upload");
    }

    #[test]
    fn test_token_environment_takes_priority() {
        assert_eq!(
            select_token(Some("from-env".into()), Some("from-config")),
            Some("from-env".to_string())
        );
        assert_eq!(
            select_token(None, Some("from-config")),
            Some("from-config".to_string())
        );
        assert_eq!(
            select_token(Some("   ".into()), Some("from-config")),
            Some("from-config".to_string())
        );
        assert_eq!(select_token(None, None), None);
        assert_eq!(select_token(Some(String::new()), Some("")), None);
    }
}
