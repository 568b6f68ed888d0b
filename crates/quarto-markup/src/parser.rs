/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Recursive-descent markup parser.
//!
//! The parser works directly on string slices of the input. Each step
//! recognises one construct at the front of the remaining input, allocates
//! its node in the [`Document`] arena and hands back the rest of the input.
//! Element content is located first and then parsed recursively as its own
//! forest.
//!
//! An element's end tag is the **first** literal `</name>` after its start
//! tag. Nesting is not tracked, so `<a><a>x</a></a>` ends the outer element
//! at the inner end tag, the inner `<a>` is left without one, and the input
//! is rejected. Serialized trees hit this only when an element is nested
//! inside another of the same name, or a comment or CDATA section contains
//! the literal end tag.

use std::io;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::document::Document;
use crate::entities::unescape;
use crate::error::{MarkupError, Result};
use crate::node::{NodeId, is_valid_name, split_qualified};
use crate::options::ParseOptions;

/// Parses a markup string into a document holding its top-level forest.
///
/// ```rust
/// use quarto_markup::parse;
///
/// let doc = parse(r#"<a href="/x" title="y">text</a>"#).unwrap();
/// let a = doc.node(doc.document_element().unwrap());
/// assert_eq!(a.attribute("href"), Some("/x"));
/// assert_eq!(a.inner_text(), "text");
/// ```
///
/// # Errors
///
/// Returns [`MarkupError::MalformedMarkup`] on truncated tags, missing end
/// tags, unterminated quotes, comments, CDATA sections or processing
/// instructions.
pub fn parse(markup: &str) -> Result<Document> {
    parse_with_options(markup, &ParseOptions::default())
}

/// Parses with explicit [`ParseOptions`].
pub fn parse_with_options(markup: &str, options: &ParseOptions) -> Result<Document> {
    debug!(bytes = markup.len(), "parsing markup");
    let mut doc = Document::new();
    let root = doc.root();
    let nodes = FragmentParser::new(markup, &mut doc, options).parse_forest(markup, 0)?;
    doc.append_children(root, nodes)?;
    debug!(
        top_level = doc.top_level().len(),
        nodes = doc.arena_len() - 1,
        "parsed markup"
    );
    Ok(doc)
}

/// Parses, capturing any failure instead of returning early.
///
/// Batch callers use this to skip a bad input and keep going.
pub fn try_parse(markup: &str) -> ParseOutcome {
    match parse(markup) {
        Ok(doc) => ParseOutcome::Parsed(doc),
        Err(err) => {
            warn!(error = %err, "markup parse failed");
            ParseOutcome::Failed(err)
        }
    }
}

/// Reads a whole file and parses it.
///
/// # Errors
///
/// Returns [`MarkupError::InvalidArgument`] for an empty path,
/// [`MarkupError::FileNotFound`] when the path does not exist, and the
/// usual parse errors otherwise.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(MarkupError::invalid_argument("path must not be empty"));
    }
    debug!(path = %path.display(), "loading markup file");
    let content = std::fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => MarkupError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => MarkupError::Io(err),
    })?;
    parse(&content)
}

/// [`parse_file`], capturing any failure.
pub fn try_parse_file(path: impl AsRef<Path>) -> ParseOutcome {
    let path = path.as_ref();
    match parse_file(path) {
        Ok(doc) => ParseOutcome::Parsed(doc),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "markup file failed to load");
            ParseOutcome::Failed(err)
        }
    }
}

/// The captured result of a `try_*` parse.
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(Document),
    Failed(MarkupError),
}

impl ParseOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            ParseOutcome::Parsed(doc) => Some(doc),
            ParseOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&MarkupError> {
        match self {
            ParseOutcome::Parsed(_) => None,
            ParseOutcome::Failed(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<Document> {
        match self {
            ParseOutcome::Parsed(doc) => Ok(doc),
            ParseOutcome::Failed(err) => Err(err),
        }
    }
}

impl From<Result<Document>> for ParseOutcome {
    fn from(result: Result<Document>) -> Self {
        match result {
            Ok(doc) => ParseOutcome::Parsed(doc),
            Err(err) => ParseOutcome::Failed(err),
        }
    }
}

impl Document {
    /// Parses `markup` and appends the resulting nodes to `parent`.
    ///
    /// On failure nothing is appended and the arena is left as it was.
    pub fn parse_fragment_into(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>> {
        if !self.kind(parent).has_children() {
            return Err(MarkupError::relation(format!(
                "a {:?} node cannot own children",
                self.kind(parent)
            )));
        }
        let nodes = self.parse_detached(markup)?;
        self.append_children(parent, nodes.iter().copied())?;
        Ok(nodes)
    }

    /// Replaces the children of `element` with the parsed `markup`.
    ///
    /// The existing children are kept if `markup` fails to parse.
    pub fn set_inner_markup(&mut self, element: NodeId, markup: &str) -> Result<()> {
        if !self.kind(element).has_children() {
            return Err(MarkupError::relation(format!(
                "a {:?} node cannot own children",
                self.kind(element)
            )));
        }
        let nodes = self.parse_detached(markup)?;
        self.clear_children(element);
        self.append_children(element, nodes)
    }

    fn parse_detached(&mut self, markup: &str) -> Result<Vec<NodeId>> {
        let mark = self.arena_len();
        let options = ParseOptions::default();
        let result = FragmentParser::new(markup, self, &options).parse_forest(markup, 0);
        if result.is_err() {
            self.truncate_arena(mark);
        }
        result
    }
}

/// Parser state: the full input (for offsets) and the arena being filled.
struct FragmentParser<'s, 'd> {
    source: &'s str,
    doc: &'d mut Document,
    options: &'d ParseOptions,
}

impl<'s, 'd> FragmentParser<'s, 'd> {
    fn new(source: &'s str, doc: &'d mut Document, options: &'d ParseOptions) -> Self {
        Self {
            source,
            doc,
            options,
        }
    }

    /// Byte offset of `at` within the source. `at` is always a subslice.
    fn offset(&self, at: &str) -> usize {
        (at.as_ptr() as usize).saturating_sub(self.source.as_ptr() as usize)
    }

    fn malformed(&self, at: &str, message: impl Into<String>) -> MarkupError {
        MarkupError::malformed(message, self.offset(at))
    }

    fn parse_forest(&mut self, input: &'s str, depth: usize) -> Result<Vec<NodeId>> {
        let mut nodes = Vec::new();
        let mut rest = input;
        loop {
            if self.options.trim_text {
                rest = rest.trim();
            }
            if rest.is_empty() {
                break;
            }
            let (node, remaining) = self.parse_node(rest, depth)?;
            nodes.push(node);
            rest = remaining;
        }
        Ok(nodes)
    }

    fn parse_node(&mut self, input: &'s str, depth: usize) -> Result<(NodeId, &'s str)> {
        if !input.starts_with('<') {
            return Ok(self.parse_text(input));
        }
        if let Some(body) = input.strip_prefix("<!--") {
            let end = body
                .find("-->")
                .ok_or_else(|| self.malformed(input, "unterminated comment, expected `-->`"))?;
            trace!(offset = self.offset(input), "comment");
            let node = self.doc.create_comment(&body[..end])?;
            return Ok((node, &body[end + 3..]));
        }
        if let Some(body) = input.strip_prefix("<![CDATA[") {
            let end = body
                .find("]]>")
                .ok_or_else(|| self.malformed(input, "unterminated CDATA section, expected `]]>`"))?;
            trace!(offset = self.offset(input), "cdata");
            let node = self.doc.create_cdata(&body[..end])?;
            return Ok((node, &body[end + 3..]));
        }
        if let Some(body) = input.strip_prefix("<?") {
            return self.parse_processing_instruction(input, body);
        }
        if input.starts_with("</") {
            return Err(self.malformed(input, "unexpected end tag"));
        }
        if input.starts_with("<!") {
            return Err(self.malformed(input, "unsupported declaration"));
        }
        self.parse_element(input, depth)
    }

    fn parse_text(&mut self, input: &'s str) -> (NodeId, &'s str) {
        let end = input.find('<').unwrap_or(input.len());
        trace!(offset = self.offset(input), len = end, "text");
        let node = self.doc.create_text(&unescape(&input[..end]));
        (node, &input[end..])
    }

    fn parse_processing_instruction(
        &mut self,
        input: &'s str,
        body: &'s str,
    ) -> Result<(NodeId, &'s str)> {
        let end = body.find("?>").ok_or_else(|| {
            self.malformed(input, "unterminated processing instruction, expected `?>`")
        })?;
        let content = &body[..end];
        let (target, value) = match content.find(char::is_whitespace) {
            Some(split) => (&content[..split], content[split..].trim()),
            None => (content, ""),
        };
        if target.is_empty() {
            return Err(self.malformed(input, "processing instruction has no target name"));
        }
        if !is_valid_name(target) {
            return Err(self.malformed(
                input,
                format!("invalid processing instruction target `{}`", target),
            ));
        }
        trace!(offset = self.offset(input), target, "processing instruction");
        let node = self.doc.create_processing_instruction(target, value)?;
        Ok((node, &body[end + 2..]))
    }

    fn parse_element(&mut self, input: &'s str, depth: usize) -> Result<(NodeId, &'s str)> {
        if depth >= self.options.max_depth {
            return Err(self.malformed(
                input,
                format!("elements nested deeper than {} levels", self.options.max_depth),
            ));
        }

        let close = self.find_tag_close(input)?;
        let mut tag = &input[1..close];
        let self_closing = tag.ends_with('/');
        if self_closing {
            tag = &tag[..tag.len() - 1];
        }

        let name_end = tag.find(char::is_whitespace).unwrap_or(tag.len());
        let qname = &tag[..name_end];
        if !is_valid_name(qname) {
            return Err(self.malformed(input, format!("invalid element name `{}`", qname)));
        }
        trace!(offset = self.offset(input), name = qname, self_closing, "element");

        let element = self.doc.create_element(qname)?;
        self.parse_attributes(element, &tag[name_end..])?;

        let after = &input[close + 1..];
        if self_closing {
            return Ok((element, after));
        }

        let end_tag = format!("</{}>", qname);
        let end = after
            .find(&end_tag)
            .ok_or_else(|| self.malformed(input, format!("missing end tag `{}`", end_tag)))?;
        let children = self.parse_forest(&after[..end], depth + 1)?;
        self.doc.append_children(element, children)?;
        Ok((element, &after[end + end_tag.len()..]))
    }

    /// Index of the `>` that closes the start tag at the front of `input`.
    ///
    /// Quoted attribute values may contain `>`.
    fn find_tag_close(&self, input: &'s str) -> Result<usize> {
        let mut quote: Option<(char, usize)> = None;
        for (index, c) in input.char_indices().skip(1) {
            match quote {
                Some((open, _)) if c == open => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some((c, index)),
                None if c == '>' => return Ok(index),
                None if c == '<' => {
                    return Err(self.malformed(input, "unterminated start tag, expected `>`"));
                }
                None => {}
            }
        }
        Err(match quote {
            Some((_, at)) => self.malformed(&input[at..], "unterminated attribute value quote"),
            None => self.malformed(input, "unterminated start tag, expected `>`"),
        })
    }

    /// Reads `name="value"` pairs separated by whitespace.
    fn parse_attributes(&mut self, element: NodeId, text: &'s str) -> Result<()> {
        let mut rest = text.trim_start();
        while !rest.is_empty() {
            let eq = rest.find('=').ok_or_else(|| {
                self.malformed(
                    rest,
                    format!("attribute `{}` has no value", rest.trim_end()),
                )
            })?;
            let qname = rest[..eq].trim_end();
            if !is_valid_name(qname) {
                return Err(self.malformed(rest, format!("invalid attribute name `{}`", qname)));
            }

            let value_part = rest[eq + 1..].trim_start();
            let quote = match value_part.chars().next() {
                Some(q @ ('"' | '\'')) => q,
                _ => {
                    return Err(self.malformed(
                        value_part,
                        format!("value of attribute `{}` must be quoted", qname),
                    ));
                }
            };
            let body = &value_part[1..];
            let close = body
                .find(quote)
                .ok_or_else(|| self.malformed(value_part, "unterminated attribute value quote"))?;

            let (prefix, local) = split_qualified(qname);
            if self
                .doc
                .attributes(element)
                .find_qualified(local, prefix)
                .is_some()
            {
                return Err(self.malformed(rest, format!("duplicate attribute `{}`", qname)));
            }
            let attribute = self
                .doc
                .create_attribute(qname, &unescape(&body[..close]))?;
            self.doc.append_attribute(element, attribute)?;

            let after = &body[close + 1..];
            if !after.is_empty() && !after.starts_with(char::is_whitespace) {
                return Err(self.malformed(after, "expected whitespace between attributes"));
            }
            rest = after.trim_start();
        }
        Ok(())
    }
}
