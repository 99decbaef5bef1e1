//! Vault key type with secure memory handling.
//!
//! The key zeroizes its memory on drop to prevent sensitive data from
//! persisting in memory. Operators handle it as standard base64 text.

use std::fmt;
use std::path::Path;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use cftool_common::{Error, Result};

/// Length of vault keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Symmetric key protecting the vault file.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey {
    key: [u8; KEY_LENGTH],
}

impl VaultKey {
    /// Create a vault key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Generate a random vault key from the operating system RNG.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Encode the key as standard base64 text.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.key)
    }

    /// Decode a key from base64 text.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    /// - Returns error if the text is not valid base64
    /// - Returns error if the decoded key is not exactly KEY_LENGTH bytes
    pub fn decode(text: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(text.trim())
                .map_err(|e| Error::InvalidKey(format!("not valid base64: {}", e)))?,
        );

        let key: [u8; KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            Error::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self { key })
    }

    /// Load a key from a file holding its base64 encoding.
    ///
    /// # Errors
    /// - Returns [`Error::Io`] if the file cannot be read
    /// - Returns [`Error::InvalidKey`] if the content is malformed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?);
        Self::decode(&text)
    }

    /// Write the base64 encoding of the key to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = Zeroizing::new(format!("{}\n", self.encode()));
        std::fs::write(path, text.as_bytes()).map_err(|e| Error::io(path, e))
    }
}

impl PartialEq for VaultKey {
    fn eq(&self, other: &Self) -> bool {
        self.key.ct_eq(&other.key).into()
    }
}

impl Eq for VaultKey {}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VaultKey([REDACTED])")
    }
}
