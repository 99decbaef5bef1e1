//! Template compiler for cftool.
//!
//! This module provides:
//! - The directive set embedded in templates (`!import`, `!ref`, `!file`,
//!   `!vault`, `!meta`)
//! - A depth-first resolver that replaces every tagged node in place
//! - The [`Template`] orchestrator tying parsing, resolution, imports and
//!   the vault together
//!
//! # Architecture
//! Resolution is single-threaded and strictly left-to-right: imports are
//! read and resolved in document order, so the first broken import in
//! document order is the one reported.

pub mod directive;
pub mod layout;
pub mod resolver;
pub mod template;

pub use directive::Directive;
pub use layout::SourceLayout;
pub use resolver::{DirectiveContext, Resolver};
pub use template::Template;
