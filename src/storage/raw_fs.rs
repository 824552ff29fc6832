// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Plain filesystem operations keyed by `(container, file_name)`.
//!
//! ## Security Note
//!
//! This module writes bytes **exactly as given**. It never encrypts or
//! decrypts; callers outside [`super::secure`] must not hand it plaintext.

use std::io;
use std::path::Path;

use tokio::fs;

use super::paths::file_path;

/// Error type for storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations, passed through unchanged
    Io(io::Error),
    /// File name would resolve outside its container
    InvalidName(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::InvalidName(name) => write!(f, "Invalid file name: {name:?}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::InvalidName(_) => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Unencrypted file store over `tokio::fs`.
///
/// Stateless: containers are plain directory paths supplied per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }

    /// Check if a file exists.
    pub async fn exists(&self, container: &Path, file_name: &str) -> bool {
        match file_path(container, file_name) {
            Ok(path) => fs::metadata(path).await.is_ok(),
            Err(_) => false,
        }
    }

    /// Read a whole file.
    pub async fn read(&self, container: &Path, file_name: &str) -> StorageResult<Vec<u8>> {
        let path = file_path(container, file_name)?;
        Ok(fs::read(path).await?)
    }

    /// Write a whole file, replacing any previous content.
    ///
    /// The container must already exist.
    pub async fn write(&self, container: &Path, file_name: &str, data: &[u8]) -> StorageResult<()> {
        let path = file_path(container, file_name)?;
        fs::write(path, data).await?;
        Ok(())
    }

    /// Delete a file. Returns whether a file was actually removed.
    pub async fn delete(&self, container: &Path, file_name: &str) -> bool {
        let Ok(path) = file_path(container, file_name) else {
            return false;
        };
        match fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "File not deleted");
                false
            }
        }
    }

    /// Create a directory (including parents). Idempotent.
    pub async fn ensure_directory(&self, path: &Path) -> StorageResult<()> {
        fs::create_dir_all(path).await?;
        Ok(())
    }
}
