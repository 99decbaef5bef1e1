//! Template orchestration.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use cftool_common::{Error, Node, Result};
use cftool_format::{parse, to_json};
use cftool_vault::Vault;

use crate::layout::SourceLayout;
use crate::resolver::{DirectiveContext, Resolver};

/// A template being compiled.
///
/// Holds the root document once loaded, the vault (if any) and the chain of
/// imports currently being resolved.
#[derive(Debug)]
pub struct Template {
    layout: SourceLayout,
    vault: Option<Vault>,
    document: Option<Node>,
    import_stack: Vec<PathBuf>,
}

impl Template {
    /// Create an empty template.
    pub fn new(layout: SourceLayout, vault: Option<Vault>) -> Self {
        Self {
            layout,
            vault,
            document: None,
            import_stack: Vec::new(),
        }
    }

    /// Get the source layout.
    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    /// Load, parse and resolve the root document from a file.
    ///
    /// # Errors
    /// - A root document is already loaded
    /// - The file cannot be read or parsed
    /// - Any directive fails to resolve
    ///
    /// On error the template stays unloaded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_unloaded()?;
        let path = path.as_ref();
        info!(path = %path.display(), "Loading template");

        let document = self.compile_file(path)?;
        self.document = Some(document);
        Ok(())
    }

    /// Parse and resolve the root document from in-memory source.
    ///
    /// Directive operands are still looked up relative to the layout's base
    /// directory.
    pub fn load_source(&mut self, source: &[u8]) -> Result<()> {
        self.ensure_unloaded()?;
        let document = self.compile(source)?;
        self.document = Some(document);
        Ok(())
    }

    /// Get the resolved root document.
    ///
    /// # Errors
    /// - Returns [`Error::NotLoaded`] if nothing was loaded
    pub fn export(&self) -> Result<&Node> {
        self.document.as_ref().ok_or(Error::NotLoaded)
    }

    /// Consume the template and return the resolved root document.
    pub fn into_document(self) -> Result<Node> {
        self.document.ok_or(Error::NotLoaded)
    }

    /// Render the resolved root document as JSON.
    pub fn to_json(&self) -> Result<String> {
        to_json(self.export()?)
    }

    fn ensure_unloaded(&self) -> Result<()> {
        if self.document.is_some() {
            return Err(Error::InvalidInput(
                "template root document is already loaded".to_string(),
            ));
        }
        Ok(())
    }

    fn compile(&mut self, source: &[u8]) -> Result<Node> {
        let document = parse(source)?;
        self.resolve(document)
    }

    fn resolve(&mut self, mut document: Node) -> Result<Node> {
        Resolver::new(self, &document).resolve(&mut document)?;
        Ok(document)
    }

    fn compile_file(&mut self, path: &Path) -> Result<Node> {
        let canonical = path.canonicalize().map_err(|e| Error::io(path, e))?;
        if self.import_stack.contains(&canonical) {
            return Err(Error::ImportCycle(canonical));
        }

        let source = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let document = parse(&source).map_err(|e| match e {
            Error::Parse(message) => Error::Parse(format!("{}: {}", path.display(), message)),
            e => e,
        })?;

        self.import_stack.push(canonical);
        let result = self.resolve(document);
        self.import_stack.pop();
        result
    }
}

impl DirectiveContext for Template {
    fn import(&mut self, name: &str) -> Result<Node> {
        let path = self.layout.import_path(name);
        debug!(path = %path.display(), "Importing document");

        self.compile_file(&path)?.into_root().ok_or_else(|| {
            Error::InvalidInput(format!("imported document {} is empty", path.display()))
        })
    }

    fn read_file(&mut self, name: &str) -> Result<String> {
        let path = self.layout.file_path(name);
        debug!(path = %path.display(), "Embedding file");

        std::fs::read_to_string(&path).map_err(|e| Error::io(path, e))
    }

    fn vault(&self) -> Option<&Node> {
        self.vault.as_ref().map(Vault::tree)
    }
}
