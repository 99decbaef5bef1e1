//! Secret vault for cftool templates.
//!
//! This module provides:
//! - Vault file locations ([`VaultConfig`])
//! - Loading a vault into a read-only document tree, degrading to "no vault"
//!   when the key or file is missing or unreadable
//! - Writing and reading the encrypted vault file
//!
//! # Architecture
//! The vault sits between the template resolver and the crypto module: the
//! resolver only ever sees a decrypted [`Vault`] tree, never key material.

pub mod config;
pub mod store;

pub use config::VaultConfig;
pub use store::{load_vault, Vault, VaultStore};
