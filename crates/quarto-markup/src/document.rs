/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Arena-backed markup document.
//!
//! All nodes of a [`Document`] live in one `Vec` and refer to each other by
//! [`NodeId`]. A parent owns its children through its [`NodeList`]s; the
//! child only keeps a plain `Option<NodeId>` back to the parent, so the tree
//! has no ownership cycles.
//!
//! The arena has a hidden container node (kind [`NodeKind::Document`]) whose
//! content list is the document's top-level forest. A parsed string may
//! produce any number of top-level nodes; [`Document::document_element`] is
//! the first top-level element among them.
//!
//! Removing a node detaches it. The id stays valid and the node can be
//! appended somewhere else later.

use tracing::trace;

use crate::error::{MarkupError, Result};
use crate::list::{ListFamily, NodeList, Nodes};
use crate::node::{NodeData, NodeId, NodeKind, is_valid_name, split_qualified};

/// A markup document: the node arena plus its top-level forest.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document with no top-level nodes.
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(32);
        nodes.push(NodeData::synthetic(NodeKind::Document));
        Self {
            nodes,
            root: NodeId::from_index(0),
        }
    }

    /// The hidden container whose children are the top-level nodes.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever allocated in this arena, detached ones included.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(data);
        id
    }

    /// Drops every node allocated after `len`. Only valid when nothing
    /// attached references those nodes.
    pub(crate) fn truncate_arena(&mut self, len: usize) {
        self.nodes.truncate(len.max(1));
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Creates a detached element. `prefix:local` names are split.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::InvalidArgument`] if `name` is empty or holds
    /// whitespace or any of `<>"'=/&?`.
    pub fn create_element(&mut self, name: &str) -> Result<NodeId> {
        let (prefix, local) = split_qualified(require_name(name, "element")?);
        Ok(self.alloc(
            NodeData::new(NodeKind::Element, local.to_string())
                .with_prefix(prefix.map(str::to_string)),
        ))
    }

    /// Creates a detached element with an explicit namespace prefix.
    pub fn create_element_ns(&mut self, prefix: Option<&str>, name: &str) -> Result<NodeId> {
        let name = require_name(name, "element")?;
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            require_name(prefix, "namespace prefix")?;
        }
        Ok(self.alloc(
            NodeData::new(NodeKind::Element, name.to_string())
                .with_prefix(prefix.filter(|p| !p.is_empty()).map(str::to_string)),
        ))
    }

    /// Creates a detached attribute. The value is stored unescaped.
    pub fn create_attribute(&mut self, name: &str, value: &str) -> Result<NodeId> {
        let (prefix, local) = split_qualified(require_name(name, "attribute")?);
        Ok(self.alloc(
            NodeData::new(NodeKind::Attribute, local.to_string())
                .with_prefix(prefix.map(str::to_string))
                .with_value(value.to_string()),
        ))
    }

    pub fn create_text(&mut self, value: &str) -> NodeId {
        self.alloc(NodeData::synthetic(NodeKind::Text).with_value(value.to_string()))
    }

    /// Creates a comment. The value may not contain `-->` or end with `-`.
    pub fn create_comment(&mut self, value: &str) -> Result<NodeId> {
        check_raw_value(NodeKind::Comment, value)?;
        Ok(self.alloc(NodeData::synthetic(NodeKind::Comment).with_value(value.to_string())))
    }

    /// Creates a CDATA section. The value may not contain `]]>`.
    pub fn create_cdata(&mut self, value: &str) -> Result<NodeId> {
        check_raw_value(NodeKind::CData, value)?;
        Ok(self.alloc(NodeData::synthetic(NodeKind::CData).with_value(value.to_string())))
    }

    /// Creates a processing instruction such as `<?xml version="1.0" ?>`.
    pub fn create_processing_instruction(&mut self, name: &str, value: &str) -> Result<NodeId> {
        let name = require_name(name, "processing instruction")?;
        check_raw_value(NodeKind::ProcessingInstruction, value)?;
        Ok(self.alloc(
            NodeData::new(NodeKind::ProcessingInstruction, name.to_string())
                .with_value(value.to_string()),
        ))
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// A borrowed handle for convenient traversal.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.data(id).kind
    }

    /// The local name. Text, comment and CDATA nodes report a synthetic name.
    pub fn name(&self, id: NodeId) -> &str {
        &self.data(id).name
    }

    pub fn namespace_prefix(&self, id: NodeId) -> Option<&str> {
        self.data(id).prefix.as_deref()
    }

    /// `prefix:name` when a prefix is set, otherwise the local name.
    pub fn qualified_name(&self, id: NodeId) -> String {
        let data = self.data(id);
        match &data.prefix {
            Some(prefix) => format!("{}:{}", prefix, data.name),
            None => data.name.clone(),
        }
    }

    /// The raw, unescaped value.
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.data(id).value.as_deref()
    }

    pub fn has_value(&self, id: NodeId) -> bool {
        self.value(id).is_some_and(|v| !v.is_empty())
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.data(id).hidden
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn children(&self, id: NodeId) -> Nodes<'_> {
        Nodes::new(self, &self.data(id).children)
    }

    pub fn attributes(&self, id: NodeId) -> Nodes<'_> {
        Nodes::new(self, &self.data(id).attributes)
    }

    /// The top-level forest.
    pub fn top_level(&self) -> Nodes<'_> {
        self.children(self.root)
    }

    /// Value of the first attribute named `name` on `element`.
    pub fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.data(element)
            .attributes
            .as_slice()
            .iter()
            .find(|&&attr| self.name(attr) == name)
            .and_then(|&attr| self.value(attr))
    }

    /// The first top-level element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.top_level().elements().next().map(|n| n.id())
    }

    /// The first top-level processing instruction, usually `<?xml ... ?>`.
    pub fn declaration(&self) -> Option<NodeId> {
        self.top_level()
            .iter()
            .find(|n| n.kind() == NodeKind::ProcessingInstruction)
            .map(|n| n.id())
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Replaces the raw value of `id`.
    ///
    /// Attributes always keep a value, so `None` clears them to `""`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::InvalidArgument`] if a comment, CDATA or
    /// processing instruction value would end its own markup early.
    pub fn set_value(&mut self, id: NodeId, value: Option<&str>) -> Result<()> {
        let kind = self.kind(id);
        if let Some(value) = value {
            check_raw_value(kind, value)?;
        }
        let value = match (kind, value) {
            (NodeKind::Attribute, None) => Some(String::new()),
            (_, value) => value.map(str::to_string),
        };
        self.data_mut(id).value = value;
        Ok(())
    }

    /// Hidden nodes stay in the tree but are skipped when serializing.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        self.data_mut(id).hidden = hidden;
    }

    /// Appends `child` to the content list of `parent`.
    ///
    /// `None` is accepted and ignored. A child that is already attached
    /// elsewhere is detached first.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::NodeRelation`] if `parent` cannot hold content,
    /// if `child` is an attribute or the document container, or if the
    /// append would make a node its own ancestor.
    pub fn append_child(&mut self, parent: NodeId, child: impl Into<Option<NodeId>>) -> Result<()> {
        let Some(child) = child.into() else {
            return Ok(());
        };
        self.check_attach(parent, child, ListFamily::Content)?;
        self.detach(child);
        self.data_mut(child).parent = Some(parent);
        self.data_mut(parent).children.push(child);
        trace!(parent = ?parent, child = ?child, "appended child");
        Ok(())
    }

    /// Appends every node in order. Stops at the first failure.
    pub fn append_children(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<()> {
        for child in children {
            self.append_child(parent, child)?;
        }
        Ok(())
    }

    /// Appends an attribute node to `element`.
    pub fn append_attribute(
        &mut self,
        element: NodeId,
        attribute: impl Into<Option<NodeId>>,
    ) -> Result<()> {
        let Some(attribute) = attribute.into() else {
            return Ok(());
        };
        self.check_attach(element, attribute, ListFamily::Attributes)?;
        self.detach(attribute);
        self.data_mut(attribute).parent = Some(element);
        self.data_mut(element).attributes.push(attribute);
        Ok(())
    }

    /// Sets the attribute `name` on `element`, updating an existing one in place.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<NodeId> {
        let (prefix, local) = split_qualified(require_name(name, "attribute")?);
        let existing = self
            .attributes(element)
            .find_qualified(local, prefix)
            .map(|n| n.id());
        match existing {
            Some(attr) => {
                self.set_value(attr, Some(value))?;
                Ok(attr)
            }
            None => {
                let attr = self.create_attribute(name, value)?;
                self.append_attribute(element, attr)?;
                Ok(attr)
            }
        }
    }

    fn check_owner(&self, parent: NodeId, family: ListFamily) -> Result<()> {
        let parent_kind = self.kind(parent);
        let accepts = match family {
            ListFamily::Content => parent_kind.has_children(),
            ListFamily::Attributes => parent_kind == NodeKind::Element,
        };
        if !accepts {
            return Err(MarkupError::relation(format!(
                "a {:?} node cannot own {}",
                parent_kind,
                match family {
                    ListFamily::Content => "children",
                    ListFamily::Attributes => "attributes",
                }
            )));
        }
        Ok(())
    }

    fn check_attach(&self, parent: NodeId, child: NodeId, family: ListFamily) -> Result<()> {
        self.check_owner(parent, family)?;
        let child_kind = self.kind(child);
        if !family.admits(child_kind) {
            return Err(MarkupError::relation(format!(
                "a {:?} node does not belong in a {:?} list",
                child_kind, family
            )));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(MarkupError::relation(
                "a node cannot be appended to itself or to one of its descendants",
            ));
        }
        Ok(())
    }

    /// Removes `id` from its parent's list. Returns false if it had no parent.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let parent_data = self.data_mut(parent);
        let removed = if parent_data.children.remove(id) {
            true
        } else {
            parent_data.attributes.remove(id)
        };
        self.data_mut(id).parent = None;
        removed
    }

    /// Detaches `id` from wherever it is attached. Same as [`Document::detach`].
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        self.detach(id)
    }

    /// Removes `child` if it is a direct child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.data(parent).children.contains(child) {
            return false;
        }
        self.detach(child)
    }

    /// Removes the first child with local name `name`.
    pub fn remove_child_named(&mut self, parent: NodeId, name: &str) -> bool {
        match self.children(parent).find(name).map(|n| n.id()) {
            Some(child) => self.detach(child),
            None => false,
        }
    }

    /// Removes the first child matching `name` and `prefix`.
    pub fn remove_child_qualified(
        &mut self,
        parent: NodeId,
        name: &str,
        prefix: Option<&str>,
    ) -> bool {
        match self
            .children(parent)
            .find_qualified(name, prefix)
            .map(|n| n.id())
        {
            Some(child) => self.detach(child),
            None => false,
        }
    }

    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> bool {
        match self.data(parent).children.get(index) {
            Some(child) => self.detach(child),
            None => false,
        }
    }

    pub fn remove_attribute(&mut self, element: NodeId, attribute: NodeId) -> bool {
        if !self.data(element).attributes.contains(attribute) {
            return false;
        }
        self.detach(attribute)
    }

    pub fn remove_attribute_named(&mut self, element: NodeId, name: &str) -> bool {
        match self.attributes(element).find(name).map(|n| n.id()) {
            Some(attr) => self.detach(attr),
            None => false,
        }
    }

    pub fn remove_attribute_qualified(
        &mut self,
        element: NodeId,
        name: &str,
        prefix: Option<&str>,
    ) -> bool {
        match self
            .attributes(element)
            .find_qualified(name, prefix)
            .map(|n| n.id())
        {
            Some(attr) => self.detach(attr),
            None => false,
        }
    }

    pub fn remove_attribute_at(&mut self, element: NodeId, index: usize) -> bool {
        match self.data(element).attributes.get(index) {
            Some(attr) => self.detach(attr),
            None => false,
        }
    }

    /// Detaches every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        for child in self.data_mut(parent).children.take_all() {
            self.data_mut(child).parent = None;
        }
    }

    /// Appends text to `parent`, extending a trailing text node if present.
    ///
    /// A hidden trailing text node is left alone and new text starts a
    /// fresh node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        self.check_owner(parent, ListFamily::Content)?;
        if let Some(last) = self.data(parent).children.last()
            && self.kind(last) == NodeKind::Text
            && !self.is_hidden(last)
        {
            let value = self.data_mut(last).value.get_or_insert_with(String::new);
            value.push_str(text);
            return Ok(last);
        }
        let node = self.create_text(text);
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Makes `element` the single top-level element. Every other top-level
    /// element is detached.
    pub fn set_document_element(&mut self, element: NodeId) -> Result<()> {
        if self.kind(element) != NodeKind::Element {
            return Err(MarkupError::relation("the document element must be an element"));
        }
        let previous: Vec<NodeId> = self
            .top_level()
            .elements()
            .map(|n| n.id())
            .filter(|&id| id != element)
            .collect();
        for id in previous {
            self.detach(id);
        }
        if self.parent(element) != Some(self.root) {
            self.append_child(self.root, element)?;
        }
        Ok(())
    }

    /// Sets the declaration processing instruction, replacing any previous one.
    pub fn set_declaration(&mut self, name: &str, value: &str) -> Result<NodeId> {
        if let Some(previous) = self.declaration() {
            self.detach(previous);
        }
        let declaration = self.create_processing_instruction(name, value)?;
        let root = self.root;
        self.data_mut(declaration).parent = Some(root);
        // Declarations lead the forest.
        self.data_mut(root).children.push_front(declaration);
        Ok(declaration)
    }

    // ---------------------------------------------------------------
    // Inner text
    // ---------------------------------------------------------------

    /// Concatenated text of the subtree, ignoring markup.
    ///
    /// Text and CDATA values contribute; comments and processing
    /// instructions do not. Hidden nodes are included.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in self.data(id).children.as_slice() {
            match self.kind(child) {
                NodeKind::Text | NodeKind::CData => out.push_str(self.value(child).unwrap_or("")),
                NodeKind::Element => self.collect_text(child, out),
                _ => {}
            }
        }
    }

    /// Replaces all children of `element` with a single text node.
    pub fn set_inner_text(&mut self, element: NodeId, text: &str) -> Result<NodeId> {
        self.check_owner(element, ListFamily::Content)?;
        self.clear_children(element);
        let node = self.create_text(text);
        self.append_child(element, node)?;
        Ok(node)
    }
}

fn require_name<'n>(name: &'n str, what: &str) -> Result<&'n str> {
    if name.trim().is_empty() {
        return Err(MarkupError::invalid_argument(format!(
            "{} name must not be empty",
            what
        )));
    }
    if !is_valid_name(name) {
        return Err(MarkupError::invalid_argument(format!(
            "{} name `{}` contains whitespace or a reserved character",
            what, name
        )));
    }
    Ok(name)
}

/// Rejects raw values that would close their own markup construct early.
fn check_raw_value(kind: NodeKind, value: &str) -> Result<()> {
    let problem = match kind {
        NodeKind::Comment if value.contains("-->") => "a comment must not contain `-->`",
        NodeKind::Comment if value.ends_with('-') => "a comment must not end with `-`",
        NodeKind::CData if value.contains("]]>") => "a CDATA section must not contain `]]>`",
        NodeKind::ProcessingInstruction if value.contains("?>") => {
            "a processing instruction must not contain `?>`"
        }
        _ => return Ok(()),
    };
    Err(MarkupError::invalid_argument(problem))
}

/// A borrowed handle to one node of a [`Document`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn kind(&self) -> NodeKind {
        self.doc.kind(self.id)
    }

    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    pub fn name(&self) -> &'a str {
        self.doc.name(self.id)
    }

    pub fn namespace_prefix(&self) -> Option<&'a str> {
        self.doc.namespace_prefix(self.id)
    }

    pub fn value(&self) -> Option<&'a str> {
        self.doc.value(self.id)
    }

    pub fn has_value(&self) -> bool {
        self.doc.has_value(self.id)
    }

    pub fn is_hidden(&self) -> bool {
        self.doc.is_hidden(self.id)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.doc.parent(self.id).map(|id| self.doc.node(id))
    }

    pub fn children(&self) -> Nodes<'a> {
        self.doc.children(self.id)
    }

    pub fn attributes(&self) -> Nodes<'a> {
        self.doc.attributes(self.id)
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.doc.attribute(self.id, name)
    }

    /// First child element with the given local name.
    pub fn child_element(&self, name: &str) -> Option<NodeRef<'a>> {
        self.children().elements_named(name).next()
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.sibling(1)
    }

    pub fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        self.sibling(-1)
    }

    fn sibling(&self, step: isize) -> Option<NodeRef<'a>> {
        let parent = self.doc.parent(self.id)?;
        let list = &self.doc.data(parent).children;
        let index = list.position(self.id)?.checked_add_signed(step)?;
        list.get(index).map(|id| self.doc.node(id))
    }

    pub fn inner_text(&self) -> String {
        self.doc.inner_text(self.id)
    }

    pub fn inner_markup(&self) -> String {
        self.doc.inner_markup(self.id)
    }

    pub fn outer_markup(&self) -> String {
        self.doc.outer_markup(self.id)
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("value", &self.value())
            .finish()
    }
}
