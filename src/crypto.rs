// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AES-128-CTR cipher adapter for files at rest.
//!
//! ## Security Note
//!
//! This module provides **confidentiality only**. Stored ciphertext carries
//! no authentication tag, so decrypting with the wrong key (or decrypting a
//! tampered file) yields garbage bytes instead of an error.
//!
//! **DO NOT** add a MAC or switch to an AEAD mode here without a migration
//! plan: the on-disk format is raw CTR output, byte-for-byte the same length
//! as the plaintext, and existing files would become unreadable.
//!
//! ## Format
//!
//! - Cipher: AES-128, CTR mode, 128-bit big-endian counter
//! - Initial counter block: `00 .. 00 01`, fresh for every call
//! - Key: 16 bytes, exchanged as 32 lowercase hex characters

use aes::cipher::{generic_array::GenericArray, KeyIvInit, StreamCipher};
use rand::{rngs::OsRng, RngCore};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// Key length in bytes (AES-128).
pub const KEY_LEN: usize = 16;

/// Initial counter block used for every encryption and decryption.
const INITIAL_COUNTER: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];

/// Errors raised while building keys or converting representations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected 16 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A validated 128-bit symmetric key.
///
/// Holding a `Key` means the length check already passed, so the cipher
/// functions below never have to re-validate.
#[derive(Clone, PartialEq, Eq)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    /// Build a key from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if !validate_key(bytes) {
            return Err(CryptoError::InvalidKeyLength(bytes.len()));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Build a key from its hex representation (32 hex characters).
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&hex_to_bytes(hex_key)?)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Lowercase hex encoding of the key.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

/// Returns true iff `bytes` is usable as an AES-128 key.
///
/// Every `u8` is already in `[0, 255]`, so only the length is checked.
pub fn validate_key(bytes: &[u8]) -> bool {
    bytes.len() == KEY_LEN
}

/// Generate a fresh random key from the OS CSPRNG.
///
/// Use [`Key::as_bytes`] and [`Key::to_hex`] for the two representations.
pub fn generate_key() -> Key {
    let mut bytes = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut bytes);
    Key(bytes)
}

/// Encrypt `plaintext`. Output has the same length as the input.
pub fn encrypt(key: &Key, plaintext: &[u8]) -> Vec<u8> {
    apply_keystream(key.as_bytes(), &INITIAL_COUNTER, plaintext)
}

/// Decrypt `ciphertext`. A wrong key produces garbage, not an error.
pub fn decrypt(key: &Key, ciphertext: &[u8]) -> Vec<u8> {
    apply_keystream(key.as_bytes(), &INITIAL_COUNTER, ciphertext)
}

fn apply_keystream(key: &[u8; KEY_LEN], counter: &[u8; 16], data: &[u8]) -> Vec<u8> {
    let mut cipher = Aes128Ctr::new(
        &GenericArray::from(*key),
        &GenericArray::from(*counter),
    );
    let mut buf = data.to_vec();
    cipher.apply_keystream(&mut buf);
    buf
}

pub fn string_to_bytes(data: &str) -> Vec<u8> {
    data.as_bytes().to_vec()
}

pub fn bytes_to_string(data: Vec<u8>) -> Result<String, CryptoError> {
    Ok(String::from_utf8(data)?)
}

/// Decode a hex string (either case) into bytes.
pub fn hex_to_bytes(hex_string: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(hex::decode(hex_string)?)
}

/// Encode bytes as lowercase hex.
pub fn bytes_to_hex(data: &[u8]) -> String {
    hex::encode(data)
}
