// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct CodedErrorBody {
    error: String,
    error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InvalidName(_) => ApiError::bad_request(e.to_string()),
            StorageError::Io(_) => {
                tracing::error!(error = %e, "Storage operation failed");
                ApiError::internal("Storage operation failed")
            }
        }
    }
}

/// Reasons an upload is rejected before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Expected exactly one file, got {0}")]
    TooManyOrNoFiles(usize),

    #[error("Content type {0:?} is not allowed")]
    DisallowedMime(String),

    #[error("Extension {0:?} is not allowed")]
    DisallowedExtension(String),

    #[error("File size {size} exceeds the limit of {max} bytes")]
    TooLarge { size: u64, max: u64 },
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::TooManyOrNoFiles(_) => "file_count",
            ValidationError::DisallowedMime(_) => "disallowed_mime",
            ValidationError::DisallowedExtension(_) => "disallowed_extension",
            ValidationError::TooLarge { .. } => "too_large",
        }
    }

    /// 412 for unprocessable files, 413 for oversized ones.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::TooManyOrNoFiles(_)
            | ValidationError::DisallowedMime(_)
            | ValidationError::DisallowedExtension(_) => StatusCode::PRECONDITION_FAILED,
            ValidationError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

/// Upload failure, surfaced to HTTP clients with a status and error code.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to store file: {0}")]
    Persist(#[source] StorageError),

    #[error("Malformed upload: {0}")]
    Malformed(#[from] MultipartError),

    #[error("Not a multipart upload: {0}")]
    NotMultipart(#[from] MultipartRejection),
}

impl UploadError {
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::Validation(e) => e.error_code(),
            UploadError::Persist(_) => "storage_error",
            UploadError::Malformed(_) | UploadError::NotMultipart(_) => "malformed_upload",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Validation(e) => e.status_code(),
            UploadError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UploadError::Malformed(e) => e.status(),
            UploadError::NotMultipart(e) => e.status(),
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = match &self {
            UploadError::Persist(_) => "Failed to store file".to_string(),
            other => other.to_string(),
        };
        let body = Json(CodedErrorBody {
            error,
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let internal = ApiError::internal("oops");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.message, "oops");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[test]
    fn validation_status_mapping() {
        assert_eq!(
            ValidationError::TooManyOrNoFiles(0).status_code(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            ValidationError::DisallowedMime("application/zip".into()).status_code(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            ValidationError::DisallowedExtension("exe".into()).status_code(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            ValidationError::TooLarge { size: 33, max: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[tokio::test]
    async fn too_large_returns_413_with_code() {
        let response =
            UploadError::from(ValidationError::TooLarge { size: 33, max: 10 }).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "too_large");
        assert_eq!(body["error"], "File size 33 exceeds the limit of 10 bytes");
    }

    #[tokio::test]
    async fn persist_failure_hides_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/secret/path");
        let response = UploadError::Persist(StorageError::Io(cause)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "storage_error");
        assert!(!body["error"].as_str().unwrap().contains("/secret/path"));
    }

    #[test]
    fn invalid_name_maps_to_bad_request() {
        let err = ApiError::from(StorageError::InvalidName("../x".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
