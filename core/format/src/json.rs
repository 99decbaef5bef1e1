//! JSON output.

use std::collections::HashSet;

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use cftool_common::{Error, Node, NodeKind, Result, METADATA_KEY};

/// Serializable view of a resolved tree.
///
/// - Mappings become objects in source key order; with duplicate keys the
///   first entry wins
/// - Scalars and aliases become strings
/// - An empty document becomes `null`
/// - The metadata entry is dropped from a document's top-level object only
///
/// Serializing a node that still carries a directive tag fails.
#[derive(Debug, Clone, Copy)]
pub struct Exported<'a> {
    node: &'a Node,
    top_level: bool,
}

impl<'a> Exported<'a> {
    /// Wrap a node for serialization.
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            top_level: false,
        }
    }
}

impl Serialize for Exported<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let node = self.node;
        if let Some(tag) = node.tag() {
            return Err(S::Error::custom(format!("unresolved directive {}", tag)));
        }

        match node.kind {
            NodeKind::Document => match node.root() {
                Some(root) => Exported {
                    node: root,
                    top_level: true,
                }
                .serialize(serializer),
                None => serializer.serialize_none(),
            },
            NodeKind::Mapping => {
                let mut seen = HashSet::new();
                let entries: Vec<_> = node
                    .pairs()
                    .filter(|(key, _)| !(self.top_level && key.value == METADATA_KEY))
                    .filter(|(key, _)| seen.insert(key.value.as_str()))
                    .collect();

                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(&key.value, &Exported::new(value))?;
                }
                map.end()
            }
            NodeKind::Sequence => {
                let mut seq = serializer.serialize_seq(Some(node.children.len()))?;
                for item in &node.children {
                    seq.serialize_element(&Exported::new(item))?;
                }
                seq.end()
            }
            NodeKind::Scalar | NodeKind::Alias => serializer.serialize_str(&node.value),
        }
    }
}

/// Render a resolved tree as pretty-printed JSON.
///
/// # Errors
/// - Returns [`Error::Serialization`] if the tree still contains directives
pub fn to_json(node: &Node) -> Result<String> {
    serde_json::to_string_pretty(&Exported::new(node))
        .map_err(|e| Error::Serialization(e.to_string()))
}
