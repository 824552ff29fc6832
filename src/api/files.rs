// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    response::Response,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, UploadError},
    state::AppState,
    upload::{parse_upload, UploadedFile},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    /// Whether a file was removed.
    pub deleted: bool,
}

#[utoipa::path(
    post,
    path = "/v1/files",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Form with exactly one file part plus optional fields"
    ),
    tag = "Files",
    responses(
        (status = 200, body = UploadedFile),
        (status = 412, description = "Wrong file count, mime type or extension"),
        (status = 413, description = "File exceeds the configured size limit"),
        (status = 500, description = "File could not be stored")
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedFile>, UploadError> {
    let request = parse_upload(multipart?).await?;
    let stored = state.storage.upload_file(request).await?;
    Ok(Json(stored))
}

#[utoipa::path(
    get,
    path = "/v1/files/{file_name}",
    params(
        ("file_name" = String, Path, description = "Stored name of the file")
    ),
    tag = "Files",
    responses(
        (status = 200, description = "Decrypted file as an attachment"),
        (status = 400, description = "File could not be read")
    )
)]
pub async fn download_file(
    Path(file_name): Path<String>,
    State(state): State<AppState>,
) -> Response {
    state.storage.download_file(&file_name).await
}

#[utoipa::path(
    delete,
    path = "/v1/files/{file_name}",
    params(
        ("file_name" = String, Path, description = "Stored name of the file")
    ),
    tag = "Files",
    responses((status = 200, body = DeleteResponse))
)]
pub async fn delete_file(
    Path(file_name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.storage.delete_file(&file_name).await?;
    Ok(Json(DeleteResponse { deleted }))
}
