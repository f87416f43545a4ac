//! REST API server module
//!
//! Exposes the importer over HTTP: inline JSON, JSON text, multipart file
//! uploads and files on the server's disk.

use crate::{Config, ContentImporter, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Import
/// - `POST /import/:content_type` - Import `{data: [...]}`
/// - `POST /import-json/:content_type` - Import `{jsonData: "<json array>"}`
/// - `POST /upload-file/:content_type` - Import an uploaded JSON file (multipart field `file`)
/// - `POST /import-local-file/:content_type` - Import `{filePath}` from the server's disk
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(importer: Arc<ContentImporter>, config: Arc<Config>) -> Router {
    let state = AppState::new(importer);

    let router = Router::new()
        // Import
        .route("/import/:content_type", post(routes::import_data))
        .route("/import-json/:content_type", post(routes::import_json))
        .route("/upload-file/:content_type", post(routes::upload_file))
        .route(
            "/import-local-file/:content_type",
            post(routes::import_local_file),
        )
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // Merge Swagger UI routes if enabled in config (before applying state)
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.server.api.max_body_bytes));

    // Apply authentication middleware if API key is configured
    let router = if config.server.api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            config.server.api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    let router = router.layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. All methods and headers are allowed either way.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server stops.
///
/// # Example
///
/// ```no_run
/// use catalog_import::{Config, ContentImporter};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let importer = Arc::new(ContentImporter::open(&config).await?);
///
/// catalog_import::api::start_api_server(importer, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(importer: Arc<ContentImporter>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(importer, config);

    let listener = TcpListener::bind(bind_address).await.map_err(|e| {
        tracing::error!(address = %bind_address, error = %e, "failed to bind API server");
        crate::error::Error::Io(e)
    })?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
