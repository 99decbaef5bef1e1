//! Common error types for cftool.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for cftool operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A document could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A node carries a tag that is not one of the known directives.
    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    /// I/O operation on a specific path failed.
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A selector path does not follow the selector grammar.
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// A `meta` directive referenced a path absent from the metadata.
    #[error("Metadata not found: {0}")]
    MetadataNotFound(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Ciphertext failed its integrity check.
    #[error("Authentication failed: ciphertext was tampered with or the key is wrong")]
    Authentication,

    /// Key material is malformed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// An import refers back to a document that is still being resolved.
    #[error("Import cycle detected at {}", .0.display())]
    ImportCycle(PathBuf),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A template was exported before anything was loaded.
    #[error("No template has been loaded")]
    NotLoaded,

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check whether the error is a missing-file condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
