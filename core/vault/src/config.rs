//! Vault file locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cftool_common::{Error, Result};

/// Default key file name, relative to the working directory.
pub const KEY_FILENAME: &str = ".vaultkey";

/// Default encrypted vault file name, relative to the working directory.
pub const VAULT_FILENAME: &str = "vault";

/// Where the vault key and encrypted vault live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// File holding the base64 vault key.
    pub key_path: PathBuf,
    /// File holding the base64 encrypted vault.
    pub vault_path: PathBuf,
}

impl VaultConfig {
    /// Create a configuration with explicit paths.
    pub fn new(key_path: impl Into<PathBuf>, vault_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            vault_path: vault_path.into(),
        }
    }

    /// Default file names placed under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(KEY_FILENAME), dir.join(VAULT_FILENAME))
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::new(KEY_FILENAME, VAULT_FILENAME)
    }
}
