// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encrypted file storage engine.
//!
//! Every byte written through [`SecureStorage`] is encrypted with the
//! configured AES-128-CTR key before it reaches [`FileStore`], and every byte
//! read back is decrypted after it leaves it. Plaintext never hits the disk.
//!
//! Ciphertext is **not authenticated**; see [`crate::crypto`].

use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

use super::{FileStore, StorageResult};
use crate::config::{ConfigError, ConfigSource, StorageConfig};
use crate::crypto::{self, Key};
use crate::error::{ApiError, UploadError, ValidationError};
use crate::upload::{write_download_response, FileDescriptor, UploadRequest, UploadedFile};

/// Prefix of the per-call health check files.
const HEALTH_CHECK_PREFIX: &str = ".health_check-";

/// Encrypted storage bound to one configuration and key.
///
/// Cheap to share behind an `Arc`; all operations take `&self`.
#[derive(Debug)]
pub struct SecureStorage {
    config: StorageConfig,
    key: Key,
    store: FileStore,
}

impl SecureStorage {
    /// Resolve the configuration, prepare the root directory and derive the key.
    ///
    /// A root directory that cannot be created is only logged; the first
    /// write will surface the problem. Missing configuration or a bad key
    /// fail initialization.
    pub async fn init(source: impl Into<ConfigSource>) -> Result<Self, ConfigError> {
        let config = source.into().resolve().inspect_err(|e| {
            error!(error = %e, "Storage configuration could not be resolved");
        })?;

        let store = FileStore::new();
        if let Err(e) = store.ensure_directory(&config.root).await {
            warn!(
                root = %config.root.display(),
                error = %e,
                "Failed to create storage root directory"
            );
        }

        let key = Key::from_hex(&config.sys_key).inspect_err(|e| {
            error!(error = %e, "Storage key is invalid");
        })?;

        info!(
            root = %config.root.display(),
            name_make_unique = config.name_make_unique,
            max_file_size = ?config.max_file_size,
            "Secure storage initialized"
        );

        Ok(Self { config, key, store })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Administrative override of the upload size limit.
    pub fn override_max_file_size(&mut self, max_file_size: Option<u64>) {
        self.config.max_file_size = max_file_size;
    }

    /// Encrypt `data` and write it under `file_name` in the root container.
    pub async fn write_file(&self, file_name: &str, data: &[u8]) -> StorageResult<()> {
        let ciphertext = crypto::encrypt(&self.key, data);
        self.store.write(&self.config.root, file_name, &ciphertext).await
    }

    /// Read `file_name` from the root container and decrypt it.
    ///
    /// Filesystem errors (including not-found) are returned unchanged.
    pub async fn read_file(&self, file_name: &str) -> StorageResult<Vec<u8>> {
        let ciphertext = self.store.read(&self.config.root, file_name).await?;
        Ok(crypto::decrypt(&self.key, &ciphertext))
    }

    /// Delete `file_name`. Returns whether a file was removed.
    ///
    /// The file is unlinked, not overwritten first.
    // TODO: overwrite the file content before unlinking once secure deletion is required.
    pub async fn delete_file(&self, file_name: &str) -> StorageResult<bool> {
        super::paths::validate_file_name(file_name)?;
        Ok(self.store.delete(&self.config.root, file_name).await)
    }

    pub async fn exists(&self, file_name: &str) -> bool {
        self.store.exists(&self.config.root, file_name).await
    }

    /// Run the upload checks in order; the first failure wins.
    ///
    /// 1. exactly one file
    /// 2. mime type allowed
    /// 3. extension allowed
    /// 4. size within limit
    pub fn validate_upload(
        &self,
        mut files: Vec<FileDescriptor>,
    ) -> Result<FileDescriptor, ValidationError> {
        if files.len() != 1 {
            return Err(ValidationError::TooManyOrNoFiles(files.len()));
        }
        let file = files.remove(0);

        if let Some(allowed) = &self.config.allowed_content_types {
            if !allowed.contains(file.file_mime.as_str()) {
                return Err(ValidationError::DisallowedMime(file.file_mime));
            }
        }

        if let Some(allowed) = &self.config.allowed_extensions {
            let extension = super::paths::extension(&file.file_name);
            if !allowed.contains(extension) {
                return Err(ValidationError::DisallowedExtension(extension.to_string()));
            }
        }

        if let Some(max) = self.config.max_file_size.filter(|&max| max > 0) {
            if file.file_size > max {
                return Err(ValidationError::TooLarge {
                    size: file.file_size,
                    max,
                });
            }
        }

        Ok(file)
    }

    /// Validate an upload and, only if it passes, persist it encrypted.
    pub async fn upload_file(&self, request: UploadRequest) -> Result<UploadedFile, UploadError> {
        let UploadRequest { files, fields } = request;
        let mut file = self.validate_upload(files).inspect_err(|e| {
            info!(reason = %e, "Upload rejected");
        })?;

        file.original_file_name = Some(file.file_name.clone());
        if self.config.name_make_unique {
            file.file_name = unique_name(&file.file_name);
        }

        if let Err(e) = self.write_file(&file.file_name, &file.file_data).await {
            error!(file_name = %file.file_name, error = %e, "Failed to persist upload");
            return Err(UploadError::Persist(e));
        }

        info!(
            file_name = %file.file_name,
            size = file.file_size,
            "Upload stored"
        );
        Ok(UploadedFile { file, fields })
    }

    /// Read and decrypt `file_name` into an attachment response.
    ///
    /// Read failures become a 400 carrying the error message.
    pub async fn download_file(&self, file_name: &str) -> Response {
        match self.read_file(file_name).await {
            Ok(data) => write_download_response(file_name, data),
            Err(e) => {
                warn!(file_name, error = %e, "Download failed");
                ApiError::bad_request(e.to_string()).into_response()
            }
        }
    }

    /// Encrypted write-read-delete round trip in the root container.
    ///
    /// Each call uses its own random file name, so stored files and
    /// concurrent checks are never touched.
    pub async fn health_check(&self) -> StorageResult<bool> {
        let check_file = format!("{HEALTH_CHECK_PREFIX}{}", uuid::Uuid::new_v4());
        let payload = b"health_check_data";
        self.write_file(&check_file, payload).await?;
        let read_back = self.read_file(&check_file).await;
        self.store.delete(&self.config.root, &check_file).await;
        Ok(read_back? == payload)
    }
}

/// Random file name keeping the extension of `file_name`.
///
/// Collisions are not checked for.
pub fn unique_name(file_name: &str) -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4(),
        super::paths::dotted_extension(file_name)
    )
}
