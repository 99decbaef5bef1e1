//! Document tree representation.
//!
//! A parsed document is a tree of [`Node`]s. Mappings keep their entries as a
//! flat, ordered list of alternating key and value children so the source
//! key order survives resolution and export.

use std::collections::BTreeMap;

/// Top-level mapping key reserved for template metadata.
///
/// The entry is addressable by `meta` directives and is dropped from the
/// exported top-level object.
pub const METADATA_KEY: &str = "CFToolMetadata";

/// Kind of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Mapping,
    Sequence,
    Scalar,
    Alias,
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Node kind.
    pub kind: NodeKind,
    /// Directive tag, including its leading `!`.
    pub tag: Option<String>,
    /// Scalar text, or the anchor name for aliases.
    pub value: String,
    /// Owned children. Mappings alternate key and value.
    pub children: Vec<Node>,
    /// Anchored nodes referenced by aliases, keyed by anchor name. Only
    /// populated on documents.
    pub anchors: BTreeMap<String, Node>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            tag: None,
            value: String::new(),
            children: Vec::new(),
            anchors: BTreeMap::new(),
        }
    }

    /// Create a document wrapping an optional root value.
    pub fn document(root: Option<Node>) -> Self {
        let mut node = Self::new(NodeKind::Document);
        node.children.extend(root);
        node
    }

    /// Create a mapping from ordered key/value pairs.
    pub fn mapping(entries: impl IntoIterator<Item = (Node, Node)>) -> Self {
        let mut node = Self::new(NodeKind::Mapping);
        for (key, value) in entries {
            node.children.push(key);
            node.children.push(value);
        }
        node
    }

    /// Create a sequence from ordered elements.
    pub fn sequence(items: impl IntoIterator<Item = Node>) -> Self {
        let mut node = Self::new(NodeKind::Sequence);
        node.children.extend(items);
        node
    }

    /// Create a plain scalar.
    pub fn scalar(value: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Scalar);
        node.value = value.into();
        node
    }

    /// Create an alias referring to `anchor`.
    pub fn alias(anchor: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Alias);
        node.value = anchor.into();
        node
    }

    /// Attach a directive tag to this node.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Directive tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Check if the node still carries a directive.
    pub fn is_tagged(&self) -> bool {
        self.tag.is_some()
    }

    /// Scalar text for scalars and aliases.
    pub fn as_scalar(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Scalar | NodeKind::Alias => Some(&self.value),
            _ => None,
        }
    }

    /// Root value of a document. Other kinds are their own root.
    pub fn root(&self) -> Option<&Node> {
        match self.kind {
            NodeKind::Document => self.children.first(),
            _ => Some(self),
        }
    }

    /// Consume a document and return its root value.
    pub fn into_root(self) -> Option<Node> {
        match self.kind {
            NodeKind::Document => self.children.into_iter().next(),
            _ => Some(self),
        }
    }

    /// Iterate the key/value pairs of a mapping, in order.
    ///
    /// Yields nothing for other kinds.
    pub fn pairs(&self) -> impl Iterator<Item = (&Node, &Node)> {
        let entries: &[Node] = if self.kind == NodeKind::Mapping {
            &self.children
        } else {
            &[]
        };
        entries.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Value of the first entry whose key text equals `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.pairs()
            .find(|(k, _)| k.as_scalar() == Some(key))
            .map(|(_, v)| v)
    }

    /// Check if any node in this subtree still carries a directive.
    pub fn has_tags(&self) -> bool {
        self.is_tagged() || self.children.iter().any(Node::has_tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::mapping([
            (Node::scalar("A"), Node::scalar("1")),
            (Node::scalar("B"), Node::sequence([Node::scalar("x")])),
            (Node::scalar("A"), Node::scalar("2")),
        ])
    }

    #[test]
    fn test_mapping_layout_alternates() {
        let node = sample();
        assert_eq!(node.children.len(), 6);
        assert_eq!(node.children[2].value, "B");
        assert_eq!(node.pairs().count(), 3);
    }

    #[test]
    fn test_get_first_match_wins() {
        let node = sample();
        assert_eq!(node.get("A").unwrap().value, "1");
        assert!(node.get("missing").is_none());
    }

    #[test]
    fn test_document_root() {
        let doc = Node::document(Some(Node::scalar("v")));
        assert_eq!(doc.root().unwrap().value, "v");
        assert!(Node::document(None).root().is_none());
        assert_eq!(doc.into_root().unwrap().value, "v");
    }

    #[test]
    fn test_has_tags() {
        let mut node = sample();
        assert!(!node.has_tags());
        node.children[1] = Node::scalar("p").with_tag("!ref");
        assert!(node.has_tags());
    }

    #[test]
    fn test_pairs_on_sequence_is_empty() {
        let node = Node::sequence([Node::scalar("a"), Node::scalar("b")]);
        assert_eq!(node.pairs().count(), 0);
        assert!(node.get("a").is_none());
    }
}
