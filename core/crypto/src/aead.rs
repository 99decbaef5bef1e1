//! Authenticated encryption using AES-256-GCM.
//!
//! AES-256-GCM provides both confidentiality and authenticity. Each
//! encryption draws a fresh 12-byte nonce from the operating system RNG.
//!
//! # Wire format
//! Vault files hold `base64(nonce || ciphertext || tag)` as produced by
//! [`seal`] and read back by [`open`].

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use cftool_common::{Error, Result};

use crate::keys::VaultKey;

/// Nonce size for AES-256-GCM (12 bytes).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

fn cipher(key: &VaultKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt plaintext using AES-256-GCM.
///
/// # Postconditions
/// - Returns nonce || ciphertext || tag
/// - The nonce is randomly generated
/// - The output length is plaintext length + NONCE_SIZE + TAG_SIZE
///
/// # Errors
/// - Returns error if encryption fails
pub fn encrypt(key: &VaultKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher(key)
        .encrypt(&nonce, plaintext)
        .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

    // Prepend nonce to ciphertext
    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypt ciphertext using AES-256-GCM.
///
/// # Preconditions
/// - Ciphertext format: nonce || encrypted_data || tag
///
/// # Errors
/// - Returns [`Error::Crypto`] if the ciphertext is too short
/// - Returns [`Error::Authentication`] if the tag does not verify
pub fn decrypt(key: &VaultKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::Crypto("Ciphertext too short".to_string()));
    }

    let (nonce_bytes, encrypted) = ciphertext.split_at(NONCE_SIZE);

    cipher(key)
        .decrypt(Nonce::from_slice(nonce_bytes), encrypted)
        .map_err(|_| Error::Authentication)
}

/// Encrypt plaintext into the base64 vault wire format.
pub fn seal(key: &VaultKey, plaintext: &[u8]) -> Result<String> {
    encrypt(key, plaintext).map(|sealed| STANDARD.encode(sealed))
}

/// Decrypt text in the base64 vault wire format.
///
/// Surrounding whitespace, such as a trailing newline from file storage, is
/// ignored.
///
/// # Errors
/// - Returns [`Error::Crypto`] if the text is not valid base64 or too short
/// - Returns [`Error::Authentication`] if the tag does not verify
pub fn open(key: &VaultKey, text: &str) -> Result<Vec<u8>> {
    let sealed = STANDARD
        .decode(text.trim())
        .map_err(|e| Error::Crypto(format!("Invalid base64: {}", e)))?;
    decrypt(key, &sealed)
}
