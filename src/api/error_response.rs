//! HTTP error response handling for the API
//!
//! Converts crate errors into HTTP responses with the status from
//! [`ToHttpStatus`] and an [`ApiError`] JSON body.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// Directly converted `ApiError`s carry no status of their own and become 500s
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use std::path::PathBuf;

    async fn body_of(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_content_type_into_response() {
        let response = Error::UnknownContentType("api::ghost.ghost".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "unknown_content_type");
        assert!(api_error.error.message.contains("api::ghost.ghost"));
        assert_eq!(
            api_error.error.details.unwrap()["content_type"],
            "api::ghost.ghost"
        );
    }

    #[tokio::test]
    async fn test_precondition_errors_are_client_errors() {
        let cases = [
            (Error::NotAnArray("object".into()), StatusCode::BAD_REQUEST, "not_an_array"),
            (Error::InvalidJson("eof".into()), StatusCode::BAD_REQUEST, "invalid_json"),
            (
                Error::FileNotFound(PathBuf::from("/data/missing.json")),
                StatusCode::NOT_FOUND,
                "file_not_found",
            ),
            (
                Error::InvalidInput("content type id is required".into()),
                StatusCode::BAD_REQUEST,
                "invalid_input",
            ),
        ];

        for (error, status, code) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), status);
            assert_eq!(body_of(response).await.error.code, code);
        }
    }

    #[tokio::test]
    async fn test_database_error_is_internal() {
        let response =
            Error::Database(DatabaseError::QueryFailed("locked".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.error.code, "database_error");
    }

    #[tokio::test]
    async fn test_api_error_defaults_to_500() {
        let response = ApiError::new("validation_error", "bad").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.error.code, "validation_error");
    }
}
