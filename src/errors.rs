use crate::{
    models::application::ValidationError,
    services::{
        application_store::StoreError, storage_service::StorageError,
        upload_validator::UploadRejection,
    },
};
use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use std::fmt;
use tracing::error;

/// An HTTP-facing error: a status plus a message that is safe to show callers.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": true,
            "message": self.message,
            "timestamp": Utc::now().to_rfc3339(),
            "status_code": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<UploadRejection> for AppError {
    fn from(err: UploadRejection) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(v) => v.into(),
            StoreError::NotFound(_) => AppError::not_found("Application not found"),
            StoreError::Sqlx(e) => {
                error!("Record store error: {}", e);
                AppError::internal("Internal server error")
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ObjectNotFound(_) => AppError::not_found("File not found in storage"),
            StorageError::InvalidObjectKey => AppError::bad_request("Invalid object key"),
            StorageError::SignatureInvalid | StorageError::UrlExpired => AppError::new(
                StatusCode::FORBIDDEN,
                "Download link is invalid or has expired",
            ),
            StorageError::WriteFailed { .. } => {
                error!("Error uploading file: {}", err);
                AppError::internal("Error processing file upload")
            }
            StorageError::DeleteFailed { .. } => {
                error!("Error deleting file: {}", err);
                AppError::internal("Error deleting file")
            }
            other => {
                error!("Storage error: {}", other);
                AppError::internal("Internal server error")
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::new(err.status(), format!("Invalid multipart request: {}", err.body_text()))
    }
}

/// Extractor rejections keep their status; server-side ones are logged and
/// replaced with a generic message.
fn from_rejection(status: StatusCode, body_text: String) -> AppError {
    if status.is_server_error() {
        error!("Request extraction failed: {}", body_text);
        AppError::new(status, "Internal server error")
    } else {
        AppError::new(status, body_text)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}
