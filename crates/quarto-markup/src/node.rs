/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Node identity, kinds and per-node storage.

use std::num::NonZeroU32;

use crate::list::{ListFamily, NodeList};

/// A typed index into a [`Document`](crate::Document)'s node arena.
///
/// `Option<NodeId>` is the same size as `NodeId`, which keeps the parent
/// back-references cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Creates the id for arena slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if the arena grows past `u32::MAX - 1` nodes.
    pub(crate) fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .expect("node arena exceeds u32 capacity");
        Self(raw)
    }

    pub(crate) fn as_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// The kind of a node. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The hidden container that owns a document's top-level forest.
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    /// A `<![CDATA[...]]>` section.
    CData,
    ProcessingInstruction,
}

impl NodeKind {
    /// The synthetic name given to kinds that carry no user-supplied name.
    pub fn synthetic_name(self) -> Option<&'static str> {
        match self {
            NodeKind::Document => Some("#document"),
            NodeKind::Text => Some("#text"),
            NodeKind::Comment => Some("#comment"),
            NodeKind::CData => Some("#cdata-section"),
            NodeKind::Element | NodeKind::Attribute | NodeKind::ProcessingInstruction => None,
        }
    }

    /// Whether nodes of this kind own a content list.
    pub fn has_children(self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::Element)
    }
}

/// Storage for a single node in the arena.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) name: String,
    pub(crate) prefix: Option<String>,
    pub(crate) value: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: NodeList,
    pub(crate) attributes: NodeList,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind, name: String) -> Self {
        Self {
            kind,
            name,
            prefix: None,
            value: None,
            hidden: false,
            parent: None,
            children: NodeList::new(ListFamily::Content),
            attributes: NodeList::new(ListFamily::Attributes),
        }
    }

    /// A node of a kind that has no user-supplied name.
    pub(crate) fn synthetic(kind: NodeKind) -> Self {
        Self::new(kind, kind.synthetic_name().unwrap_or_default().to_string())
    }

    pub(crate) fn with_value(mut self, value: String) -> Self {
        self.value = Some(value);
        self
    }

    pub(crate) fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }
}

/// Splits `prefix:local` at the first `:`.
///
/// A name without a colon, or with an empty side, is returned unsplit.
pub(crate) fn split_qualified(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, qname),
    }
}

/// Whether `name` can appear as an element, attribute or processing
/// instruction name without breaking the markup around it.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | '=' | '/' | '&' | '?'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_round_trips_index() {
        let id = NodeId::from_index(0);
        assert_eq!(id.as_index(), 0);
        assert_eq!(NodeId::from_index(41).as_index(), 41);
        assert_eq!(
            std::mem::size_of::<Option<NodeId>>(),
            std::mem::size_of::<NodeId>()
        );
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("csl:style"));
        assert!(is_valid_name("data-size"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a b"));
        for bad in ["a<", "a>", "a\"", "a'", "a=b", "a/", "a&b", "a?"] {
            assert!(!is_valid_name(bad), "{}", bad);
        }
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("csl:style"), (Some("csl"), "style"));
        assert_eq!(split_qualified("style"), (None, "style"));
        assert_eq!(split_qualified(":style"), (None, ":style"));
        assert_eq!(split_qualified("a:b:c"), (Some("a"), "b:c"));
    }

    #[test]
    fn test_synthetic_names() {
        assert_eq!(NodeKind::Text.synthetic_name(), Some("#text"));
        assert_eq!(NodeKind::Element.synthetic_name(), None);
        assert!(NodeKind::Element.has_children());
        assert!(!NodeKind::Attribute.has_children());
    }
}
