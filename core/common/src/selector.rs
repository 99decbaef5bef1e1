//! Path selectors for addressing a single node inside a document tree.
//!
//! A selector is a `.`-separated list of segments. Each segment is one of:
//! - a bare key: any run of characters except `.`, `"`, `[`, `]` and whitespace
//! - a quoted key: `"a.b"`, with `\"` and `\\` escapes
//! - an index: `[N]` for a non-negative integer `N`
//!
//! For example `Resources."my.bucket".Tags.[0]`.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::node::{Node, NodeKind};
use crate::{Error, Result};

/// One step of a selector path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Mapping key lookup.
    Key(String),
    /// Sequence element lookup.
    Index(usize),
}

/// A parsed selector path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    segments: Vec<Segment>,
}

impl Selector {
    /// Parse a selector string.
    ///
    /// # Errors
    /// - Returns error if the path is empty
    /// - Returns error if any segment does not follow the grammar
    pub fn parse(path: &str) -> Result<Self> {
        let mut chars = path.char_indices().peekable();
        let mut segments = Vec::new();

        loop {
            segments.push(parse_segment(path, &mut chars)?);
            match chars.next() {
                None => break,
                Some((_, '.')) => continue,
                Some((pos, c)) => {
                    return Err(Error::Selector(format!(
                        "unexpected '{}' at offset {} in '{}'",
                        c, pos, path
                    )))
                }
            }
        }

        Ok(Self { segments })
    }

    /// Get the path segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Locate the node addressed by this selector.
    ///
    /// Selection starts at the root value when `root` is a document. Returns
    /// `None` when any segment fails to match.
    pub fn select<'a>(&self, root: &'a Node) -> Option<&'a Node> {
        let mut current = root.root()?;
        for segment in &self.segments {
            current = match (segment, current.kind) {
                (Segment::Key(key), NodeKind::Mapping) => current.get(key)?,
                (Segment::Index(index), NodeKind::Sequence) => current.children.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Index(index) => write!(f, "[{}]", index)?,
                Segment::Key(key) if key.is_empty() || key.chars().any(is_reserved) => {
                    write!(f, "\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))?
                }
                Segment::Key(key) => f.write_str(key)?,
            }
        }
        Ok(())
    }
}

/// Select `path` within `root`.
///
/// A malformed path is treated like an unmatched one.
pub fn select<'a>(root: &'a Node, path: &str) -> Option<&'a Node> {
    Selector::parse(path).ok()?.select(root)
}

fn is_reserved(c: char) -> bool {
    matches!(c, '.' | '"' | '[' | ']') || c.is_whitespace()
}

fn parse_segment(path: &str, chars: &mut Peekable<CharIndices<'_>>) -> Result<Segment> {
    match chars.peek().copied() {
        None => Err(Error::Selector(format!("missing segment in '{}'", path))),
        Some((_, '"')) => {
            chars.next();
            let mut key = String::new();
            loop {
                match chars.next() {
                    None => {
                        return Err(Error::Selector(format!(
                            "unterminated quote in '{}'",
                            path
                        )))
                    }
                    Some((_, '"')) => return Ok(Segment::Key(key)),
                    Some((_, '\\')) => match chars.next() {
                        Some((_, c @ ('"' | '\\'))) => key.push(c),
                        _ => {
                            return Err(Error::Selector(format!(
                                "invalid escape in '{}'",
                                path
                            )))
                        }
                    },
                    Some((_, c)) => key.push(c),
                }
            }
        }
        Some((start, '[')) => {
            chars.next();
            let mut digits = String::new();
            while let Some((_, c)) = chars.next_if(|(_, c)| c.is_ascii_digit()) {
                digits.push(c);
            }
            if chars.next_if(|(_, c)| *c == ']').is_none() || digits.is_empty() {
                return Err(Error::Selector(format!(
                    "malformed index at offset {} in '{}'",
                    start, path
                )));
            }
            digits
                .parse()
                .map(Segment::Index)
                .map_err(|e| Error::Selector(format!("index out of range in '{}': {}", path, e)))
        }
        Some((start, c)) if is_reserved(c) => Err(Error::Selector(format!(
            "unexpected '{}' at offset {} in '{}'",
            c, start, path
        ))),
        Some(_) => {
            let mut key = String::new();
            while let Some((_, c)) = chars.next_if(|(_, c)| !is_reserved(*c)) {
                key.push(c);
            }
            Ok(Segment::Key(key))
        }
    }
}
