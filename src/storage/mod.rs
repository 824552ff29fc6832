// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Encrypted File Storage
//!
//! Files are stored on the local filesystem, encrypted with AES-128-CTR.
//!
//! ## Layers
//!
//! - `secure` - [`SecureStorage`]: encrypt-before-write, decrypt-after-read,
//!   upload validation and unique naming
//! - `raw_fs` - [`FileStore`]: plain `(container, file_name)` filesystem I/O
//! - `paths` - file name validation and extension handling
//!
//! ## Storage Layout
//!
//! ```text
//! <root>/
//!   {file_name}         # ciphertext, same length as the plaintext
//!   {uuid}.{ext}        # uploads when nameMakeUnique is set
//! ```
//!
//! ## Important Notes
//!
//! - Ciphertext is **not authenticated**; a wrong key reads back as garbage
//! - Concurrent writes to the same file name race; the last writer wins
//! - Deletion unlinks the file; content is not wiped

pub mod paths;
pub mod raw_fs;
pub mod secure;

pub use raw_fs::{FileStore, StorageError, StorageResult};
pub use secure::{unique_name, SecureStorage};
