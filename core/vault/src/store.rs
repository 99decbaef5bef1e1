//! Loading and writing the encrypted vault file.

use std::path::Path;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use cftool_common::{select, Error, Node, Result};
use cftool_crypto::{open, seal, VaultKey};
use cftool_format::parse;

use crate::config::VaultConfig;

/// Decrypted vault contents.
///
/// Read-only once loaded.
#[derive(Debug, Clone)]
pub struct Vault {
    tree: Node,
}

impl Vault {
    /// Wrap an already decrypted document tree.
    pub fn new(tree: Node) -> Self {
        Self { tree }
    }

    /// Get the vault document.
    pub fn tree(&self) -> &Node {
        &self.tree
    }

    /// Select a value by path. See [`cftool_common::selector`] for the
    /// path grammar.
    pub fn select(&self, path: &str) -> Option<&Node> {
        select(&self.tree, path)
    }
}

/// Access to the key file and encrypted vault file.
#[derive(Debug, Clone, Default)]
pub struct VaultStore {
    config: VaultConfig,
}

impl VaultStore {
    /// Create a store over the given file locations.
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    /// Get the store configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Load the vault key.
    pub fn load_key(&self) -> Result<VaultKey> {
        VaultKey::load(&self.config.key_path)
    }

    /// Load and decrypt the vault.
    ///
    /// # Returns
    /// - `Ok(None)` if the key file or vault file is absent, or the vault is empty
    /// - `Ok(Some(_))` with the decrypted tree otherwise
    ///
    /// # Errors
    /// - Malformed key file
    /// - Unreadable vault file
    /// - Authentication failure or invalid wire format
    /// - Decrypted content is not a valid document
    pub fn try_load(&self) -> Result<Option<Vault>> {
        let key = match self.load_key() {
            Ok(key) => key,
            Err(e) if e.is_not_found() => {
                debug!(path = %self.config.key_path.display(), "No vault key, vault disabled");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(text) = self.read_sealed()? else {
            return Ok(None);
        };

        let plaintext = Zeroizing::new(open(&key, &text)?);
        let tree = parse(&plaintext)?;

        debug!(path = %self.config.vault_path.display(), "Vault loaded");
        Ok(Some(Vault::new(tree)))
    }

    /// Load the vault, treating every failure as "no vault".
    ///
    /// Failures other than missing files are reported as warnings.
    pub fn load(&self) -> Option<Vault> {
        match self.try_load() {
            Ok(vault) => vault,
            Err(e) => {
                warn!(error = %e, "Vault unavailable, continuing without secrets");
                None
            }
        }
    }

    /// Decrypt the vault file and return its plaintext.
    ///
    /// # Errors
    /// - Returns error if the vault file is missing or empty
    /// - Returns error if decryption fails
    pub fn read_plaintext(&self, key: &VaultKey) -> Result<Vec<u8>> {
        let text = self.read_sealed()?.ok_or_else(|| {
            Error::InvalidInput(format!(
                "vault file {} is missing or empty",
                self.config.vault_path.display()
            ))
        })?;
        open(key, &text)
    }

    /// Encrypt `plaintext` and write it as the vault file.
    ///
    /// # Errors
    /// - Returns [`Error::Parse`] if `plaintext` is not a valid document
    /// - Returns error if encryption or the write fails
    pub fn write(&self, key: &VaultKey, plaintext: &[u8]) -> Result<()> {
        parse(plaintext)?;

        let path = &self.config.vault_path;
        let sealed = seal(key, plaintext)?;
        std::fs::write(path, format!("{}\n", sealed)).map_err(|e| Error::io(path, e))?;

        info!(path = %path.display(), size = plaintext.len(), "Vault written");
        Ok(())
    }

    fn read_sealed(&self) -> Result<Option<String>> {
        let path = &self.config.vault_path;
        match std::fs::read_to_string(path) {
            Ok(text) if text.trim().is_empty() => {
                debug!(path = %path.display(), "Vault file is empty");
                Ok(None)
            }
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No vault file");
                Ok(None)
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }
}

/// Load the vault from explicit key and vault paths.
///
/// Returns `None` when no usable vault exists.
pub fn load_vault(key_path: impl AsRef<Path>, vault_path: impl AsRef<Path>) -> Option<Vault> {
    VaultStore::new(VaultConfig::new(key_path.as_ref(), vault_path.as_ref())).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cftool_common::NodeKind;
    use tempfile::TempDir;

    const SECRETS: &[u8] = b"Database:\n  Password: hunter2\nTokens: [a, b]\n";

    fn store_with_key(temp: &TempDir) -> (VaultStore, VaultKey) {
        let store = VaultStore::new(VaultConfig::in_dir(temp.path()));
        let key = VaultKey::generate();
        key.save(&store.config().key_path).unwrap();
        (store, key)
    }

    #[test]
    fn test_write_then_load() {
        let temp = TempDir::new().unwrap();
        let (store, key) = store_with_key(&temp);

        store.write(&key, SECRETS).unwrap();
        let vault = store.try_load().unwrap().unwrap();

        assert_eq!(vault.select("Database.Password").unwrap().value, "hunter2");
        assert_eq!(vault.select("Tokens.[1]").unwrap().value, "b");
        assert!(vault.select("Database.Missing").is_none());
        assert_eq!(store.read_plaintext(&key).unwrap(), SECRETS);
    }

    #[test]
    fn test_no_key_means_no_vault() {
        let temp = TempDir::new().unwrap();
        let store = VaultStore::new(VaultConfig::in_dir(temp.path()));
        std::fs::write(&store.config().vault_path, "ignored").unwrap();

        assert!(store.try_load().unwrap().is_none());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_missing_or_empty_vault_file() {
        let temp = TempDir::new().unwrap();
        let (store, _) = store_with_key(&temp);
        assert!(store.try_load().unwrap().is_none());

        std::fs::write(&store.config().vault_path, "\n").unwrap();
        assert!(store.try_load().unwrap().is_none());
    }

    #[test]
    fn test_wrong_key_degrades() {
        let temp = TempDir::new().unwrap();
        let (store, key) = store_with_key(&temp);
        store.write(&key, SECRETS).unwrap();

        VaultKey::generate().save(&store.config().key_path).unwrap();
        assert!(matches!(store.try_load(), Err(Error::Authentication)));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_malformed_key_degrades() {
        let temp = TempDir::new().unwrap();
        let store = VaultStore::new(VaultConfig::in_dir(temp.path()));
        std::fs::write(&store.config().key_path, "short").unwrap();

        assert!(matches!(store.try_load(), Err(Error::InvalidKey(_))));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_write_rejects_invalid_document() {
        let temp = TempDir::new().unwrap();
        let (store, key) = store_with_key(&temp);

        assert!(matches!(
            store.write(&key, b"a: [unterminated"),
            Err(Error::Parse(_))
        ));
        assert!(!store.config().vault_path.exists());
    }

    #[test]
    fn test_load_vault_helper() {
        let temp = TempDir::new().unwrap();
        let (store, key) = store_with_key(&temp);
        store.write(&key, SECRETS).unwrap();

        let vault = load_vault(&store.config().key_path, &store.config().vault_path).unwrap();
        assert_eq!(vault.tree().kind, NodeKind::Document);
    }
}
