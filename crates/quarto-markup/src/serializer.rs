/*
 * serializer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Markup output for any node of a [`Document`].
//!
//! Hidden nodes are skipped wherever they appear below the node being
//! serialized. Asking for the outer markup of a hidden node directly still
//! renders it.

use crate::document::Document;
use crate::entities::escape;
use crate::node::{NodeId, NodeKind};

/// Serializes `node`, or returns an empty string for `None`.
pub fn to_markup(doc: &Document, node: Option<NodeId>) -> String {
    node.map_or_else(String::new, |id| doc.outer_markup(id))
}

impl Document {
    /// The serialized form of `id` itself.
    ///
    /// ```rust
    /// use quarto_markup::Document;
    ///
    /// let mut doc = Document::new();
    /// let img = doc.create_element("img").unwrap();
    /// doc.set_attribute(img, "src", "a&b.png").unwrap();
    /// assert_eq!(doc.outer_markup(img), r#"<img src="a&amp;b.png" />"#);
    /// ```
    pub fn outer_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_outer(id, &mut out);
        out
    }

    /// Concatenated outer markup of the visible children of `id`.
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_children(id, &mut out);
        out
    }

    /// The whole top-level forest.
    pub fn to_markup_string(&self) -> String {
        self.inner_markup(self.root())
    }

    fn visible<'a>(&'a self, ids: &'a [NodeId]) -> impl Iterator<Item = NodeId> + 'a {
        ids.iter().copied().filter(|&id| !self.is_hidden(id))
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for child in self.visible(self.children(id).ids()) {
            self.write_outer(child, out);
        }
    }

    fn write_qualified_name(&self, id: NodeId, out: &mut String) {
        if let Some(prefix) = self.namespace_prefix(id) {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(self.name(id));
    }

    fn write_outer(&self, id: NodeId, out: &mut String) {
        let value = self.value(id).unwrap_or("");
        match self.kind(id) {
            NodeKind::Document => self.write_children(id, out),
            NodeKind::Attribute => {
                if !value.is_empty() {
                    self.write_qualified_name(id, out);
                    out.push_str("=\"");
                    out.push_str(&escape(value));
                    out.push('"');
                }
            }
            NodeKind::Text => out.push_str(&escape(value)),
            NodeKind::Comment => {
                out.push_str("<!--");
                out.push_str(value);
                out.push_str("-->");
            }
            NodeKind::CData => {
                out.push_str("<![CDATA[");
                out.push_str(value);
                out.push_str("]]>");
            }
            NodeKind::ProcessingInstruction => {
                out.push_str("<?");
                out.push_str(self.name(id));
                out.push(' ');
                if !value.is_empty() {
                    out.push_str(value);
                    out.push(' ');
                }
                out.push_str("?>");
            }
            NodeKind::Element => self.write_element(id, out),
        }
    }

    fn write_element(&self, id: NodeId, out: &mut String) {
        out.push('<');
        self.write_qualified_name(id, out);
        for attr in self.visible(self.attributes(id).ids()) {
            if self.has_value(attr) {
                out.push(' ');
                self.write_outer(attr, out);
            }
        }

        let has_content = self.visible(self.children(id).ids()).next().is_some();
        if !has_content {
            out.push_str(" />");
            return;
        }
        out.push('>');
        self.write_children(id, out);
        out.push_str("</");
        self.write_qualified_name(id, out);
        out.push('>');
    }
}
