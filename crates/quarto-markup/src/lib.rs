/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Markup document model, parser and serializer for Quarto.
//!
//! This crate handles the small XML/HTML subset used by Quarto's own
//! theme and index files: elements with quoted attributes, self-closing
//! tags, comments, CDATA sections, processing instructions and text. It is
//! not a conforming XML parser; there is no DTD, schema or namespace
//! resolution.
//!
//! # Overview
//!
//! - [`Document`]: an arena of nodes plus the top-level forest
//! - [`NodeId`] / [`NodeRef`]: node identity and a borrowed read handle
//! - [`Nodes`]: an ordered child or attribute list with name lookups
//! - [`parse`] / [`try_parse`] / [`parse_file`]: markup in
//! - [`Document::outer_markup`] / [`to_markup`]: markup out
//!
//! # Example
//!
//! ```rust
//! use quarto_markup::{Document, parse};
//!
//! let doc = parse(r#"<Styles><Style name="dark"><Color key="fg" value="white"/></Style></Styles>"#)
//!     .unwrap();
//! let styles = doc.node(doc.document_element().unwrap());
//! let style = styles.child_element("Style").unwrap();
//! assert_eq!(style.attribute("name"), Some("dark"));
//!
//! let mut out = Document::new();
//! let ul = out.create_element("ul").unwrap();
//! out.set_document_element(ul).unwrap();
//! let li = out.create_element("li").unwrap();
//! out.append_child(ul, li).unwrap();
//! out.append_text(li, "a & b").unwrap();
//! assert_eq!(out.to_markup_string(), "<ul><li>a &amp; b</li></ul>");
//! ```

mod diagnostic;
pub mod document;
pub mod entities;
pub mod error;
pub mod list;
pub mod node;
pub mod options;
pub mod parser;
pub mod serializer;

// Re-export main types
pub use document::{Document, NodeRef};
pub use entities::{escape, unescape};
pub use error::{MarkupError, Result};
pub use list::{ListFamily, NodeList, Nodes};
pub use node::{NodeId, NodeKind};
pub use options::ParseOptions;
pub use parser::{
    ParseOutcome, parse, parse_file, parse_with_options, try_parse, try_parse_file,
};
pub use serializer::to_markup;
