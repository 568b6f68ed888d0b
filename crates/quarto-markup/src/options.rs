/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parser configuration.

/// Default limit on element nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options controlling how markup is parsed.
///
/// ```rust
/// use quarto_markup::{ParseOptions, parse_with_options};
///
/// let options = ParseOptions::default().with_trim_text(false);
/// let doc = parse_with_options("<p> spaced </p>", &options).unwrap();
/// let p = doc.document_element().unwrap();
/// assert_eq!(doc.inner_text(p), " spaced ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum element nesting depth. Deeper input is rejected as malformed
    /// instead of growing the stack.
    pub max_depth: usize,

    /// Trim surrounding whitespace before each node. When disabled,
    /// whitespace between tags is kept as text nodes.
    pub trim_text: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            trim_text: true,
        }
    }
}

impl ParseOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_trim_text(mut self, trim_text: bool) -> Self {
        self.trim_text = trim_text;
        self
    }
}
