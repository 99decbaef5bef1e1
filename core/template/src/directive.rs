//! Template directives.

use std::fmt;

use cftool_common::{Error, Node, Result};

/// A recognized directive tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `!import name`: splice in the resolved root of `imports/name.yml`.
    Import,
    /// `!ref name`: `{"Ref": name}`.
    Ref,
    /// `!file path`: embed `files/path` as an `Fn::Join` of its lines.
    File,
    /// `!vault path`: value selected from the vault, or `""`.
    Vault,
    /// `!meta path`: value selected from the document's metadata.
    Meta,
}

impl Directive {
    /// All directives, in tag order.
    pub const ALL: [Directive; 5] = [
        Directive::Import,
        Directive::Ref,
        Directive::File,
        Directive::Vault,
        Directive::Meta,
    ];

    /// Look up the directive for a tag. Matching is exact and case-sensitive.
    pub fn from_tag(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|directive| directive.tag() == tag)
            .ok_or_else(|| Error::UnknownTag(tag.to_string()))
    }

    /// Tag text, including the leading `!`.
    pub fn tag(self) -> &'static str {
        match self {
            Directive::Import => "!import",
            Directive::Ref => "!ref",
            Directive::File => "!file",
            Directive::Vault => "!vault",
            Directive::Meta => "!meta",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// `{"Ref": name}`
pub fn ref_node(name: &str) -> Node {
    Node::mapping([(Node::scalar("Ref"), Node::scalar(name))])
}

/// `{"Fn::Join": ["", [line, ...]]}`
///
/// Lines keep their terminators, so joining them reproduces `content` exactly.
pub fn join_node(content: &str) -> Node {
    let lines = Node::sequence(content.split_inclusive('\n').map(Node::scalar));
    Node::mapping([(
        Node::scalar("Fn::Join"),
        Node::sequence([Node::scalar(""), lines]),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        for directive in Directive::ALL {
            assert_eq!(Directive::from_tag(directive.tag()).unwrap(), directive);
        }
        assert!(matches!(Directive::from_tag("!bogus"), Err(Error::UnknownTag(t)) if t == "!bogus"));
        assert!(Directive::from_tag("!REF").is_err());
        assert!(Directive::from_tag("ref").is_err());
    }

    #[test]
    fn test_ref_node() {
        let node = ref_node("MyParam");
        assert_eq!(node.get("Ref").unwrap().value, "MyParam");
        assert_eq!(node.children.len(), 2);
    }

    #[test]
    fn test_join_node_reproduces_content() {
        let content = "#!/bin/sh\necho hi\n\nexit 0";
        let node = join_node(content);

        let args = node.get("Fn::Join").unwrap();
        assert_eq!(args.children[0].value, "");
        let lines: Vec<_> = args.children[1]
            .children
            .iter()
            .map(|line| line.value.as_str())
            .collect();
        assert_eq!(lines, ["#!/bin/sh\n", "echo hi\n", "\n", "exit 0"]);
        assert_eq!(lines.concat(), content);
    }

    #[test]
    fn test_join_node_empty_file() {
        let node = join_node("");
        assert!(node.get("Fn::Join").unwrap().children[1].children.is_empty());
    }
}
