//! YAML input.

use std::collections::{BTreeMap, HashMap};

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use cftool_common::{Error, Node, NodeKind, Result};

/// Tag prefix of the YAML core schema (`!!str`, `!!int`, ...).
const CORE_SCHEMA_PREFIX: &str = "tag:yaml.org,2002:";

/// Parse YAML bytes into a document node.
///
/// Scalars keep their source text exactly (`5.10`, `0x1F`, `~` and `True`
/// are not reinterpreted); a missing value is the empty string. Directive
/// tags are kept verbatim including the leading `!`, while core schema tags
/// such as `!!str` are dropped. Mapping entries keep their source order and
/// duplicates. Aliases stay [`NodeKind::Alias`] nodes carrying the anchor
/// name; the anchored nodes they refer to are recorded on the document.
///
/// # Errors
/// - Returns [`Error::Parse`] for malformed YAML, invalid UTF-8 or a
///   multi-document stream
/// - Returns [`Error::Parse`] if a mapping key is a mapping or sequence
pub fn parse(bytes: &[u8]) -> Result<Node> {
    let source = std::str::from_utf8(bytes).map_err(|e| Error::Parse(e.to_string()))?;

    let mut builder = TreeBuilder::new(source);
    Parser::new_from_str(source)
        .load(&mut builder, true)
        .map_err(|e| Error::Parse(e.to_string()))?;
    builder.finish()
}

/// Builds the node tree from parser events.
struct TreeBuilder<'s> {
    source: &'s str,
    /// Open documents and collections with their anchor ids.
    stack: Vec<(Node, usize)>,
    documents: Vec<Node>,
    anchored: HashMap<usize, Node>,
    anchors: BTreeMap<String, Node>,
    error: Option<Error>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            stack: Vec::new(),
            documents: Vec::new(),
            anchored: HashMap::new(),
            anchors: BTreeMap::new(),
            error: None,
        }
    }

    fn finish(mut self) -> Result<Node> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(self.documents.pop().unwrap_or_else(|| Node::document(None)))
    }

    fn handle(&mut self, event: Event, mark: Marker) -> Result<()> {
        match event {
            Event::DocumentStart { .. } => {
                if !self.documents.is_empty() {
                    return Err(Error::Parse(format!(
                        "multiple documents in one stream (line {})",
                        mark.line()
                    )));
                }
                self.stack.push((Node::document(None), 0));
            }
            Event::DocumentEnd { .. } => {
                if let Some((mut document, _)) = self.stack.pop() {
                    document.anchors = std::mem::take(&mut self.anchors);
                    self.anchored.clear();
                    self.documents.push(document);
                }
            }
            Event::Scalar(value, style, anchor, tag) => {
                let mut node = Node::scalar(self.scalar_text(value, style, mark));
                node.tag = tag.and_then(|tag| directive_tag(&tag.handle, &tag.suffix));
                self.attach(node, anchor)?;
            }
            Event::Alias(id) => {
                let name = self.alias_name(id, mark);
                if let Some(target) = self.anchored.get(&id) {
                    self.anchors.insert(name.clone(), target.clone());
                }
                self.attach(Node::alias(name), 0)?;
            }
            Event::SequenceStart(anchor, tag) => {
                let mut node = Node::sequence(Vec::<Node>::new());
                node.tag = tag.and_then(|tag| directive_tag(&tag.handle, &tag.suffix));
                self.stack.push((node, anchor));
            }
            Event::MappingStart(anchor, tag) => {
                let mut node = Node::mapping(Vec::<(Node, Node)>::new());
                node.tag = tag.and_then(|tag| directive_tag(&tag.handle, &tag.suffix));
                self.stack.push((node, anchor));
            }
            Event::SequenceEnd | Event::MappingEnd => {
                if let Some((node, anchor)) = self.stack.pop() {
                    self.attach(node, anchor)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Append a completed node to the innermost open parent.
    fn attach(&mut self, node: Node, anchor: usize) -> Result<()> {
        if anchor != 0 {
            self.anchored.insert(anchor, node.clone());
        }

        let Some((parent, _)) = self.stack.last_mut() else {
            return Err(Error::Parse("node outside of a document".to_string()));
        };
        let is_key = parent.kind == NodeKind::Mapping && parent.children.len() % 2 == 0;
        if is_key && node.as_scalar().is_none() {
            return Err(Error::Parse(format!(
                "mapping keys must be scalars (found {:?})",
                node.kind
            )));
        }
        parent.children.push(node);
        Ok(())
    }

    /// Scalar text as written. The reader reports a missing value as a plain
    /// `~`; only a `~` actually present in the source is kept.
    fn scalar_text(&self, value: String, style: TScalarStyle, mark: Marker) -> String {
        if style == TScalarStyle::Plain
            && value == "~"
            && self.source.chars().nth(mark.index()) != Some('~')
        {
            return String::new();
        }
        value
    }

    /// Anchor name of an alias, read back from the `*name` token.
    fn alias_name(&self, id: usize, mark: Marker) -> String {
        let mut chars = self.source.chars().skip(mark.index());
        if chars.next() == Some('*') {
            let name: String = chars
                .take_while(|c| !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '{' | '}'))
                .collect();
            if !name.is_empty() {
                return name;
            }
        }
        id.to_string()
    }
}

impl MarkedEventReceiver for TreeBuilder<'_> {
    fn on_event(&mut self, event: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.handle(event, mark) {
            self.error = Some(e);
        }
    }
}

fn directive_tag(handle: &str, suffix: &str) -> Option<String> {
    if handle == CORE_SCHEMA_PREFIX {
        return None;
    }
    Some(format!("{}{}", handle, suffix))
}
