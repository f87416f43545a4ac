use super::*;
use crate::db::{Database, NewContentType};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

mod import;

const PRODUCT: &str = "api::product.product";

/// Test host: SQLite database in a temp dir with one registered content type
struct TestHost {
    db: Arc<Database>,
    importer: Arc<ContentImporter>,
    config: Arc<Config>,
    dir: TempDir,
}

async fn create_test_host(customize: impl FnOnce(&mut Config)) -> TestHost {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.persistence.database_path = dir.path().join("host.db");
    config.persistence.media_dir = dir.path().join("uploads");
    config.upload.temp_dir = dir.path().to_path_buf();
    config.upload.fallback_enabled = false;
    config.upload.token_env = "CATALOG_IMPORT_TEST_TOKEN_NEVER_SET".into();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    customize(&mut config);

    let db = Arc::new(Database::new(&config.persistence).await.unwrap());
    db.register_content_type(&NewContentType {
        uid: PRODUCT.to_string(),
        display_name: "Product".to_string(),
        required_fields: vec!["title".to_string()],
    })
    .await
    .unwrap();

    let importer = Arc::new(ContentImporter::from_database(&config, db.clone()).unwrap());
    TestHost {
        db,
        importer,
        config: Arc::new(config),
        dir,
    }
}

impl TestHost {
    fn router(&self) -> Router {
        create_router(self.importer.clone(), self.config.clone())
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let host = create_test_host(|_| {}).await;

    let api_handle = tokio::spawn({
        let importer = host.importer.clone();
        let config = host.config.clone();
        async move { start_api_server(importer, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");
    api_handle.abort();
}

#[tokio::test]
async fn test_health_endpoint() {
    let host = create_test_host(|_| {}).await;

    let response = host
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let host = create_test_host(|_| {}).await;

    let response = host
        .router()
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["paths"]["/import/{content_type}"].is_object());
}

#[tokio::test]
async fn test_cors_enabled() {
    let host = create_test_host(|config| {
        config.server.api.cors_enabled = true;
        config.server.api.cors_origins = vec!["*".to_string()];
    })
    .await;

    let response = host
        .router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let host = create_test_host(|config| config.server.api.cors_enabled = false).await;

    let response = host
        .router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_authentication_with_api_key() {
    let host = create_test_host(|config| {
        config.server.api.api_key = Some("test-secret-key".to_string());
    })
    .await;
    let app = host.router();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Api-Key", "test-secret-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let enabled = create_test_host(|_| {}).await;
    let response = enabled
        .router()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let disabled = create_test_host(|config| config.server.api.swagger_ui = false).await;
    let response = disabled
        .router()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
