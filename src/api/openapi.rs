//! OpenAPI documentation and schema generation
//!
//! Generated at compile time with utoipa.

use utoipa::OpenApi;

/// OpenAPI documentation for the catalog-import REST API
///
/// Served at `/openapi.json` and, when enabled, through `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "catalog-import REST API",
        version = "0.1.0",
        description = "Bulk JSON record import with image URL materialization",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6790", description = "Local development server")
    ),
    paths(
        // Import
        crate::api::routes::import_data,
        crate::api::routes::import_json,
        crate::api::routes::upload_file,
        crate::api::routes::import_local_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::ImportResult,
        crate::types::RecordError,

        crate::api::routes::ImportDataRequest,
        crate::api::routes::ImportJsonRequest,
        crate::api::routes::ImportLocalFileRequest,
        crate::api::routes::ImportResponse,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "import", description = "Import records into a content type, uploading embedded images"),
        (name = "system", description = "Health check and OpenAPI spec"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the `X-Api-Key` header scheme
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
