//! Common utilities and types shared across cftool modules.
//!
//! This module provides the document tree every other crate reads and
//! mutates, the selector used to address nodes inside it, and the shared
//! error type.

pub mod error;
pub mod node;
pub mod selector;

pub use error::{Error, Result};
pub use node::{Node, NodeKind, METADATA_KEY};
pub use selector::{select, Segment, Selector};
