// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Translation between HTTP payloads and in-memory file descriptors.
//!
//! Inbound: a `multipart/form-data` body becomes an [`UploadRequest`].
//! Outbound: decrypted bytes become an attachment response.
//! Both directions buffer the whole file.

use std::collections::BTreeMap;

use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;

/// Mime type assumed when a file part carries no `Content-Type`.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Transfer encoding assumed when a file part does not declare one.
pub const DEFAULT_ENCODING: &str = "7bit";

/// Content type of every download response.
pub const DOWNLOAD_CONTENT_TYPE: &str = "application/download";

const CONTENT_TRANSFER_ENCODING: HeaderName = HeaderName::from_static("content-transfer-encoding");

/// One uploaded or stored file.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Name the file is stored under (may be rewritten to a unique name).
    pub file_name: String,
    /// Name as received from the client, set once the upload is accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
    pub file_encoding: String,
    pub file_mime: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Plaintext content. Never serialized.
    #[serde(skip)]
    pub file_data: Vec<u8>,
}

impl FileDescriptor {
    pub fn new(file_name: impl Into<String>, file_mime: impl Into<String>, file_data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            original_file_name: None,
            file_encoding: DEFAULT_ENCODING.to_string(),
            file_mime: file_mime.into(),
            file_size: file_data.len() as u64,
            file_data,
        }
    }
}

/// Buffered contents of an upload request.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// File parts, in request order.
    pub files: Vec<FileDescriptor>,
    /// Plain form fields.
    pub fields: BTreeMap<String, String>,
}

impl UploadRequest {
    /// Request carrying a single file and no form fields.
    pub fn single(file: FileDescriptor) -> Self {
        Self {
            files: vec![file],
            fields: BTreeMap::new(),
        }
    }
}

/// Result of an accepted upload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadedFile {
    #[serde(flatten)]
    pub file: FileDescriptor,
    /// Plain form fields sent along with the file.
    pub fields: BTreeMap<String, String>,
}

/// Extract every file part and form field from a multipart body.
pub async fn parse_upload(mut multipart: Multipart) -> Result<UploadRequest, MultipartError> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await?;
            request.fields.insert(name, value);
            continue;
        };

        // Empty file inputs arrive as parts with `filename=""`.
        if file_name.is_empty() {
            continue;
        }

        let file_mime = field.content_type().unwrap_or(DEFAULT_MIME).to_string();
        let file_encoding = field
            .headers()
            .get(&CONTENT_TRANSFER_ENCODING)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_ENCODING)
            .to_string();
        let file_data = field.bytes().await?.to_vec();

        request.files.push(FileDescriptor {
            file_encoding,
            ..FileDescriptor::new(file_name, file_mime, file_data)
        });
    }

    Ok(request)
}

/// Build the attachment response for a decrypted file.
pub fn write_download_response(file_name: &str, data: Vec<u8>) -> Response {
    let disposition = format!("attachment;filename={file_name}");
    let Ok(disposition) = HeaderValue::from_bytes(disposition.as_bytes()) else {
        return ApiError::bad_request("File name cannot be sent as a header").into_response();
    };

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(DOWNLOAD_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
            (CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("binary")),
        ],
        data,
    )
        .into_response()
}
