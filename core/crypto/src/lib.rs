//! Cryptographic primitives for the cftool vault.
//!
//! This module provides:
//! - Authenticated encryption using AES-256-GCM
//! - The base64 wire format used for vault files
//! - Vault key generation, encoding and loading with automatic zeroization
//!
//! # Security Guarantees
//! - Key material is zeroized on drop and never printed by `Debug`
//! - Decryption fails closed: no plaintext is returned unless the tag verifies
//! - Key comparisons run in constant time

pub mod aead;
pub mod keys;

pub use aead::{decrypt, encrypt, open, seal};
pub use keys::{VaultKey, KEY_LENGTH};
