//! Depth-first directive resolution.
//!
//! The resolver walks a document and replaces each tagged node with the
//! output of its directive, then descends into whatever now occupies that
//! slot. Imported documents can carry further directives, so resolution
//! recurses until no tags remain.

use tracing::{debug, warn};

use cftool_common::{Error, Node, Result, Selector, METADATA_KEY};

use crate::directive::{join_node, ref_node, Directive};

/// Upper bound on directives applied to a single slot.
///
/// A selected metadata or vault value may itself be tagged; the bound stops a
/// self-referencing chain.
pub const MAX_CHAINED_DIRECTIVES: usize = 32;

/// Side-effecting services directives depend on.
pub trait DirectiveContext {
    /// Load and fully resolve the document imported as `name`, returning its
    /// root value.
    fn import(&mut self, name: &str) -> Result<Node>;

    /// Read the file embedded as `name`.
    fn read_file(&mut self, name: &str) -> Result<String>;

    /// Decrypted vault document, if one is loaded.
    fn vault(&self) -> Option<&Node>;
}

/// Resolves the directives of one document.
pub struct Resolver<'c, C: DirectiveContext + ?Sized> {
    context: &'c mut C,
    metadata: Option<Node>,
}

impl<'c, C: DirectiveContext + ?Sized> Resolver<'c, C> {
    /// Create a resolver for `document`.
    ///
    /// The document's top-level metadata entry, if present, is captured here
    /// and serves every `!meta` directive in the document.
    pub fn new(context: &'c mut C, document: &Node) -> Self {
        let metadata = document
            .root()
            .and_then(|root| root.get(METADATA_KEY))
            .cloned();
        Self { context, metadata }
    }

    /// Resolve every directive in `node`, in place.
    ///
    /// # Errors
    /// - Unknown tag
    /// - Non-scalar directive operand
    /// - Import or file read failure, including parse errors in imports
    /// - `!meta` path not present in the metadata
    ///
    /// The first error aborts resolution; `node` is then partially resolved
    /// and must be discarded.
    pub fn resolve(&mut self, node: &mut Node) -> Result<()> {
        let mut applied = 0;
        while let Some(tag) = node.tag() {
            if applied == MAX_CHAINED_DIRECTIVES {
                return Err(Error::InvalidInput(format!(
                    "more than {} chained directives ending at {}",
                    MAX_CHAINED_DIRECTIVES, tag
                )));
            }
            let directive = Directive::from_tag(tag)?;
            *node = self.apply(directive, node)?;
            applied += 1;
        }

        for child in &mut node.children {
            self.resolve(child)?;
        }
        Ok(())
    }

    fn apply(&mut self, directive: Directive, node: &Node) -> Result<Node> {
        let operand = node.as_scalar().ok_or_else(|| {
            Error::InvalidInput(format!("{} expects a scalar operand", directive))
        })?;
        debug!(%directive, operand, "Applying directive");

        match directive {
            Directive::Import => self.context.import(operand),
            Directive::Ref => Ok(ref_node(operand)),
            Directive::File => self.context.read_file(operand).map(|text| join_node(&text)),
            Directive::Vault => Ok(self.select_vault(operand)),
            Directive::Meta => self.select_metadata(operand),
        }
    }

    fn select_vault(&self, path: &str) -> Node {
        let Some(vault) = self.context.vault() else {
            return Node::scalar("");
        };

        let selector = match Selector::parse(path) {
            Ok(selector) => selector,
            Err(e) => {
                warn!(error = %e, "Invalid vault path, substituting empty value");
                return Node::scalar("");
            }
        };

        match selector.select(vault) {
            Some(found) => found.clone(),
            None => {
                warn!(path, "Vault path not found, substituting empty value");
                Node::scalar("")
            }
        }
    }

    fn select_metadata(&self, path: &str) -> Result<Node> {
        let metadata = self
            .metadata
            .as_ref()
            .ok_or_else(|| Error::MetadataNotFound(format!("{} (no {})", path, METADATA_KEY)))?;

        Selector::parse(path)?
            .select(metadata)
            .cloned()
            .ok_or_else(|| Error::MetadataNotFound(path.to_string()))
    }
}
