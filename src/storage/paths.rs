// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the container layout.
//!
//! A container is a directory; every stored file lives directly inside it:
//!
//! ```text
//! <root>/
//!   <file_name>      # AES-128-CTR ciphertext
//! ```

use std::path::{Path, PathBuf};

use super::{StorageError, StorageResult};

/// Check that `file_name` names a single entry inside a container.
///
/// Rejects empty names, `.`/`..` and anything containing a path separator,
/// so a caller-supplied name can never resolve outside the container.
pub fn validate_file_name(file_name: &str) -> StorageResult<()> {
    let invalid = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StorageError::InvalidName(file_name.to_string()));
    }
    Ok(())
}

/// Path of `file_name` inside `container`.
pub fn file_path(container: &Path, file_name: &str) -> StorageResult<PathBuf> {
    validate_file_name(file_name)?;
    Ok(container.join(file_name))
}

/// Extension including the leading dot (`"a.tar.gz"` -> `".gz"`).
///
/// Returns `""` when there is no extension. A leading dot alone
/// (`".bashrc"`) does not count as one.
pub fn dotted_extension(file_name: &str) -> &str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[idx..],
        _ => "",
    }
}

/// Extension without the leading dot, case preserved.
pub fn extension(file_name: &str) -> &str {
    dotted_extension(file_name).trim_start_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_joins_container() {
        assert_eq!(
            file_path(Path::new("/tmp/c"), "data.txt").unwrap(),
            PathBuf::from("/tmp/c/data.txt")
        );
    }

    #[test]
    fn rejects_escaping_names() {
        for name in ["", ".", "..", "../x", "a/b", "a\\b", "nul\0"] {
            assert!(
                matches!(validate_file_name(name), Err(StorageError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_plain_names() {
        for name in ["data.txt", ".health_check", "no-extension", "a..b"] {
            assert!(validate_file_name(name).is_ok(), "{name:?} should be accepted");
        }
    }

    #[test]
    fn extension_takes_last_dot() {
        assert_eq!(dotted_extension("upload.txt"), ".txt");
        assert_eq!(extension("upload.txt"), "txt");
        assert_eq!(extension("archive.tar.gz"), "gz");
        assert_eq!(extension("UPPER.TXT"), "TXT");
    }

    #[test]
    fn extension_missing() {
        assert_eq!(dotted_extension("README"), "");
        assert_eq!(dotted_extension(".bashrc"), "");
        assert_eq!(extension(".bashrc"), "");
        assert_eq!(dotted_extension("dir.d/file"), "");
    }

    #[test]
    fn trailing_dot_is_empty_extension() {
        assert_eq!(dotted_extension("file."), ".");
        assert_eq!(extension("file."), "");
    }
}
