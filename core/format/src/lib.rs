//! Document formats for cftool.
//!
//! Templates are read as YAML and written as JSON:
//! - [`parse`] turns YAML bytes into a document [`Node`](cftool_common::Node),
//!   keeping directive tags and mapping order
//! - [`to_json`] renders a resolved tree, dropping the top-level metadata entry

pub mod json;
pub mod yaml;

pub use json::{to_json, Exported};
pub use yaml::parse;
