/*
 * list.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Ordered child and attribute collections.
//!
//! Every element owns two [`NodeList`]s: one for content (elements, text,
//! comments, CDATA, processing instructions) and one for attributes. The
//! list itself only stores ids; name-based lookups go through the borrowed
//! [`Nodes`] view, which pairs a list with the arena that owns the nodes.
//!
//! Lookups are linear scans. Markup trees handled here are small.

use crate::document::{Document, NodeRef};
use crate::node::{NodeId, NodeKind};

/// Which node kinds a list accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFamily {
    /// Any node except attributes and the document container.
    Content,
    /// Attribute nodes only.
    Attributes,
}

impl ListFamily {
    pub fn admits(self, kind: NodeKind) -> bool {
        match self {
            ListFamily::Content => !matches!(kind, NodeKind::Attribute | NodeKind::Document),
            ListFamily::Attributes => kind == NodeKind::Attribute,
        }
    }
}

/// Owned, append-only storage of node ids in insertion order.
#[derive(Debug, Clone)]
pub struct NodeList {
    family: ListFamily,
    ids: Vec<NodeId>,
}

impl NodeList {
    pub(crate) fn new(family: ListFamily) -> Self {
        Self {
            family,
            ids: Vec::new(),
        }
    }

    pub fn family(&self) -> ListFamily {
        self.family
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.ids.get(index).copied()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.ids.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.ids.last().copied()
    }

    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.ids.iter().position(|&candidate| candidate == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_some()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.ids
    }

    pub(crate) fn push(&mut self, id: NodeId) {
        self.ids.push(id);
    }

    pub(crate) fn push_front(&mut self, id: NodeId) {
        self.ids.insert(0, id);
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_all(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.ids)
    }
}

/// A borrowed view over a [`NodeList`] with name-aware lookups.
#[derive(Clone, Copy)]
pub struct Nodes<'a> {
    doc: &'a Document,
    list: &'a NodeList,
}

impl<'a> Nodes<'a> {
    pub(crate) fn new(doc: &'a Document, list: &'a NodeList) -> Self {
        Self { doc, list }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeRef<'a>> {
        self.list.get(index).map(|id| self.doc.node(id))
    }

    pub fn first(&self) -> Option<NodeRef<'a>> {
        self.list.first().map(|id| self.doc.node(id))
    }

    pub fn last(&self) -> Option<NodeRef<'a>> {
        self.list.last().map(|id| self.doc.node(id))
    }

    pub fn ids(&self) -> &'a [NodeId] {
        self.list.as_slice()
    }

    pub fn iter(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        self.list.as_slice().iter().map(move |&id| doc.node(id))
    }

    /// First node whose local name is `name`, regardless of prefix.
    pub fn find(self, name: &str) -> Option<NodeRef<'a>> {
        self.iter().find(|node| node.name() == name)
    }

    /// First node matching both the local name and the namespace prefix.
    ///
    /// `None` as the prefix matches only unprefixed nodes.
    pub fn find_qualified(self, name: &str, prefix: Option<&str>) -> Option<NodeRef<'a>> {
        self.iter()
            .find(|node| node.name() == name && node.namespace_prefix() == prefix)
    }

    /// Only the element nodes of this list.
    pub fn elements(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.iter().filter(|node| node.kind() == NodeKind::Element)
    }

    /// Element nodes with the given local name.
    pub fn elements_named<'n>(
        self,
        name: &'n str,
    ) -> impl Iterator<Item = NodeRef<'a>> + use<'a, 'n> {
        self.elements().filter(move |node| node.name() == name)
    }
}

impl std::fmt::Debug for Nodes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_admits() {
        assert!(ListFamily::Content.admits(NodeKind::Element));
        assert!(ListFamily::Content.admits(NodeKind::CData));
        assert!(!ListFamily::Content.admits(NodeKind::Attribute));
        assert!(!ListFamily::Content.admits(NodeKind::Document));
        assert!(ListFamily::Attributes.admits(NodeKind::Attribute));
        assert!(!ListFamily::Attributes.admits(NodeKind::Text));
    }

    #[test]
    fn test_lookups_by_name_and_prefix() {
        let mut doc = Document::new();
        let root = doc.create_element("root").unwrap();
        let plain = doc.create_element("item").unwrap();
        let prefixed = doc.create_element("csl:item").unwrap();
        let text = doc.create_text("between");
        doc.append_children(root, [prefixed, text, plain]).unwrap();

        let children = doc.children(root);
        assert_eq!(children.len(), 3);
        assert_eq!(children.find("item").map(|n| n.id()), Some(prefixed));
        assert_eq!(
            children.find_qualified("item", None).map(|n| n.id()),
            Some(plain)
        );
        assert_eq!(
            children.find_qualified("item", Some("csl")).map(|n| n.id()),
            Some(prefixed)
        );
        assert!(children.find("missing").is_none());
        assert_eq!(children.elements().count(), 2);
        assert_eq!(children.elements_named("item").count(), 2);
        assert_eq!(children.first().map(|n| n.id()), Some(prefixed));
        assert_eq!(children.last().map(|n| n.id()), Some(plain));
        assert_eq!(children.get(1).map(|n| n.kind()), Some(NodeKind::Text));
        assert!(children.get(3).is_none());
    }

    #[test]
    fn test_lookup_names_may_be_short_lived() {
        let mut doc = Document::new();
        let root = doc.create_element("root").unwrap();
        let item = doc.create_element("item").unwrap();
        doc.append_child(root, item).unwrap();

        let children = doc.children(root);
        let count = {
            let name = String::from("item");
            children.elements_named(&name).count()
        };
        assert_eq!(count, 1);
        let found = doc.node(root).child_element(&String::from("item"));
        assert_eq!(found.map(|n| n.id()), Some(item));
    }

    #[test]
    fn test_empty_view() {
        let mut doc = Document::new();
        let root = doc.create_element("root").unwrap();
        let children = doc.children(root);
        assert!(children.is_empty());
        assert!(children.first().is_none());
        assert!(children.last().is_none());
    }
}
