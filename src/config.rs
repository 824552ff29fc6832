// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Storage configuration is either passed in directly or loaded once, at
//! engine initialization, from a named entry of an environment-suffixed JSON
//! file (`<STORAGE_CONFIG_DIR>/storage.<APP_ENV>.json`).
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `STORAGE_CONFIG_DIR` | Directory holding `storage.<env>.json` | `server` |
//! | `APP_ENV` | Environment suffix of the config file | `development` |
//! | `STORAGE_CONFIG_NAME` | Entry loaded by the server binary | `secureStorageConfig` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! ## File Format
//!
//! ```json
//! {
//!   "secureStorageConfig": {
//!     "root": "storage/container",
//!     "nameMakeUnique": true,
//!     "maxFileSize": 52428800,
//!     "allowedContentTypes": ["text/plain"],
//!     "allowedExtensions": ["txt"],
//!     "sysKey": "000102030405060708090a0b0c0d0e0f"
//!   }
//! }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const STORAGE_CONFIG_DIR_ENV: &str = "STORAGE_CONFIG_DIR";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const STORAGE_CONFIG_NAME_ENV: &str = "STORAGE_CONFIG_NAME";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_CONFIG_DIR: &str = "server";
pub const DEFAULT_APP_ENV: &str = "development";
pub const DEFAULT_CONFIG_NAME: &str = "secureStorageConfig";

/// Transport-level request body cap. `maxFileSize` is the semantic limit.
pub const UPLOAD_BODY_LIMIT: usize = as_mib(64) as usize;

/// Errors raised while resolving a storage configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config entry `{name}` not found in {path}")]
    MissingEntry { name: String, path: PathBuf },

    #[error("invalid storage key: {0}")]
    Key(#[from] crate::crypto::CryptoError),
}

/// Storage configuration, immutable once an engine is built from it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Base directory (container) for all stored files.
    pub root: PathBuf,
    /// Rewrite uploaded file names to a unique value.
    #[serde(default)]
    pub name_make_unique: bool,
    /// Maximum accepted upload size in bytes. `0` means no limit.
    #[serde(default)]
    pub max_file_size: Option<u64>,
    /// Whitelist of accepted mime types.
    #[serde(default)]
    pub allowed_content_types: Option<BTreeSet<String>>,
    /// Whitelist of accepted extensions, without the leading dot.
    #[serde(default)]
    pub allowed_extensions: Option<BTreeSet<String>>,
    /// Symmetric key as 32 hex characters.
    #[serde(alias = "key")]
    pub sys_key: String,
}

impl StorageConfig {
    /// Minimal configuration: no constraints, names kept as received.
    pub fn new(root: impl AsRef<Path>, sys_key: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            name_make_unique: false,
            max_file_size: None,
            allowed_content_types: None,
            allowed_extensions: None,
            sys_key: sys_key.into(),
        }
    }

    pub fn with_unique_names(mut self, enabled: bool) -> Self {
        self.name_make_unique = enabled;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    pub fn with_allowed_content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_content_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }
}

/// Where an engine gets its configuration from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Use this object as-is.
    Inline(StorageConfig),
    /// Named entry in the environment-selected config file.
    Named(String),
    /// Named entry in an explicit config file.
    File { path: PathBuf, name: String },
}

impl From<StorageConfig> for ConfigSource {
    fn from(config: StorageConfig) -> Self {
        ConfigSource::Inline(config)
    }
}

impl From<&str> for ConfigSource {
    fn from(name: &str) -> Self {
        ConfigSource::Named(name.to_string())
    }
}

impl ConfigSource {
    pub fn resolve(self) -> Result<StorageConfig, ConfigError> {
        match self {
            ConfigSource::Inline(config) => Ok(config),
            ConfigSource::Named(name) => load_named_config(&config_file_from_env(), &name),
            ConfigSource::File { path, name } => load_named_config(&path, &name),
        }
    }
}

/// Path of the environment-suffixed config file inside `dir`.
pub fn config_file_path(dir: impl AsRef<Path>, app_env: &str) -> PathBuf {
    dir.as_ref().join(format!("storage.{app_env}.json"))
}

/// Config file selected by `STORAGE_CONFIG_DIR` and `APP_ENV`.
pub fn config_file_from_env() -> PathBuf {
    let dir = std::env::var(STORAGE_CONFIG_DIR_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let app_env = std::env::var(APP_ENV_ENV).unwrap_or_else(|_| DEFAULT_APP_ENV.into());
    config_file_path(dir, &app_env)
}

/// Load the entry `name` from a JSON config file.
pub fn load_named_config(path: &Path, name: &str) -> Result<StorageConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries: HashMap<String, serde_json::Value> =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let entry = entries.remove(name).ok_or_else(|| ConfigError::MissingEntry {
        name: name.to_string(),
        path: path.to_path_buf(),
    })?;

    serde_json::from_value(entry).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `n` kibibytes in bytes.
pub const fn as_kib(n: u64) -> u64 {
    n << 10
}

/// `n` mebibytes in bytes.
pub const fn as_mib(n: u64) -> u64 {
    n << 20
}

/// `n` gibibytes in bytes.
pub const fn as_gib(n: u64) -> u64 {
    n << 30
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f";

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = config_file_path(dir, "test");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn size_helpers() {
        assert_eq!(as_kib(1), 1024);
        assert_eq!(as_mib(1), 1024 * 1024);
        assert_eq!(as_gib(1), 1024 * 1024 * 1024);
        assert_eq!(as_mib(50), 52_428_800);
    }

    #[test]
    fn config_file_is_env_suffixed() {
        assert_eq!(
            config_file_path("server", "production"),
            PathBuf::from("server/storage.production.json")
        );
    }

    #[test]
    fn loads_named_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            &format!(
                r#"{{
                    "other": {{ "root": "x", "sysKey": "{KEY_HEX}" }},
                    "secureStorageConfig": {{
                        "root": "storage/container",
                        "nameMakeUnique": true,
                        "maxFileSize": 52428800,
                        "allowedContentTypes": ["text/plain"],
                        "allowedExtensions": ["txt"],
                        "sysKey": "{KEY_HEX}"
                    }}
                }}"#
            ),
        );

        let config = load_named_config(&path, "secureStorageConfig").unwrap();
        assert_eq!(config.root, PathBuf::from("storage/container"));
        assert!(config.name_make_unique);
        assert_eq!(config.max_file_size, Some(as_mib(50)));
        assert!(config.allowed_content_types.unwrap().contains("text/plain"));
        assert!(config.allowed_extensions.unwrap().contains("txt"));
        assert_eq!(config.sys_key, KEY_HEX);
    }

    #[test]
    fn optional_fields_default_to_unconstrained() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            &format!(r#"{{ "cfg": {{ "root": "c", "key": "{KEY_HEX}" }} }}"#),
        );

        let config = load_named_config(&path, "cfg").unwrap();
        assert_eq!(config, StorageConfig::new("c", KEY_HEX));
    }

    #[test]
    fn missing_entry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "{}");

        let err = load_named_config(&path, "secureStorageConfig").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEntry { ref name, .. } if name == "secureStorageConfig"));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_named_config(&dir.path().join("nope.json"), "cfg").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "{ not json");
        assert!(matches!(
            load_named_config(&path, "cfg"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn inline_source_resolves_to_itself() {
        let config = StorageConfig::new("c", KEY_HEX).with_max_file_size(10);
        let resolved = ConfigSource::from(config.clone()).resolve().unwrap();
        assert_eq!(resolved, config);
    }

    #[test]
    fn file_source_resolves_named_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            &format!(r#"{{ "cfg": {{ "root": "c", "sysKey": "{KEY_HEX}" }} }}"#),
        );

        let resolved = ConfigSource::File {
            path,
            name: "cfg".into(),
        }
        .resolve()
        .unwrap();
        assert_eq!(resolved.root, PathBuf::from("c"));
    }
}
