//! Import handlers.

use super::{ImportDataRequest, ImportJsonRequest, ImportLocalFileRequest, ImportResponse};
use crate::api::AppState;
use crate::error::Error;
use crate::importer::parse_json_records;
use axum::{
    Json,
    extract::{Multipart, Path, State},
};

/// POST /import/:content_type - Import inline records
#[utoipa::path(
    post,
    path = "/import/{content_type}",
    tag = "import",
    params(("content_type" = String, Path, description = "Content type id, e.g. api::product.product")),
    request_body = ImportDataRequest,
    responses(
        (status = 200, description = "Import finished", body = ImportResponse),
        (status = 400, description = "`data` is not an array", body = crate::error::ApiError),
        (status = 404, description = "Unknown content type", body = crate::error::ApiError)
    )
)]
pub async fn import_data(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    Json(request): Json<ImportDataRequest>,
) -> Result<Json<ImportResponse>, Error> {
    let result = state
        .importer
        .import_json(&content_type, request.data)
        .await?;
    Ok(Json(result.into()))
}

/// POST /import-json/:content_type - Import records given as JSON text
#[utoipa::path(
    post,
    path = "/import-json/{content_type}",
    tag = "import",
    params(("content_type" = String, Path, description = "Content type id")),
    request_body = ImportJsonRequest,
    responses(
        (status = 200, description = "Import finished", body = ImportResponse),
        (status = 400, description = "Invalid JSON or not an array", body = crate::error::ApiError),
        (status = 404, description = "Unknown content type", body = crate::error::ApiError)
    )
)]
pub async fn import_json(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    Json(request): Json<ImportJsonRequest>,
) -> Result<Json<ImportResponse>, Error> {
    let records = parse_json_records(&request.json_data)?;
    let result = state.importer.import_data(&content_type, records).await?;
    Ok(Json(result.into()))
}

/// POST /upload-file/:content_type - Import an uploaded JSON file
#[utoipa::path(
    post,
    path = "/upload-file/{content_type}",
    tag = "import",
    params(("content_type" = String, Path, description = "Content type id")),
    request_body(content = Vec<u8>, description = "JSON file in the multipart field `file`", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import finished", body = ImportResponse),
        (status = 400, description = "Missing file, invalid JSON or not an array", body = crate::error::ApiError),
        (status = 404, description = "Unknown content type", body = crate::error::ApiError)
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, Error> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.json").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidInput(format!("failed to read file: {}", e)))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(Error::InvalidInput(
            "no file provided in 'file' field".to_string(),
        ));
    };

    let text = String::from_utf8(bytes)
        .map_err(|e| Error::InvalidJson(format!("{}: {}", filename, e)))?;
    let records = parse_json_records(&text).map_err(|e| match e {
        Error::InvalidJson(reason) => Error::InvalidJson(format!("{}: {}", filename, reason)),
        other => other,
    })?;

    tracing::info!(filename = %filename, records = records.len(), "received import upload");
    let result = state.importer.import_data(&content_type, records).await?;
    Ok(Json(result.into()))
}

/// POST /import-local-file/:content_type - Import a JSON file from the server's disk
#[utoipa::path(
    post,
    path = "/import-local-file/{content_type}",
    tag = "import",
    params(("content_type" = String, Path, description = "Content type id")),
    request_body = ImportLocalFileRequest,
    responses(
        (status = 200, description = "Import finished", body = ImportResponse),
        (status = 400, description = "Missing path, invalid JSON or not an array", body = crate::error::ApiError),
        (status = 404, description = "Unknown content type or file not found", body = crate::error::ApiError)
    )
)]
pub async fn import_local_file(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    Json(request): Json<ImportLocalFileRequest>,
) -> Result<Json<ImportResponse>, Error> {
    if request.file_path.trim().is_empty() {
        return Err(Error::InvalidInput("filePath is required".to_string()));
    }
    let result = state
        .importer
        .import_from_file(&content_type, &request.file_path)
        .await?;
    Ok(Json(result.into()))
}
