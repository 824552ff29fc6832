// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Secure File Storage - encrypted-at-rest file storage
//!
//! Files are encrypted with AES-128-CTR before they are written to the local
//! filesystem and decrypted when read back. Uploads are validated (file
//! count, mime type, extension, size) before anything is written.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Storage configuration and environment
//! - `crypto` - AES-128-CTR cipher adapter and key handling
//! - `storage` - Encrypted storage engine over the filesystem
//! - `upload` - Multipart parsing and download responses

pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod state;
pub mod storage;
pub mod upload;
