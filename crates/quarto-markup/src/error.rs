/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for markup parsing and tree manipulation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for quarto-markup operations.
pub type Result<T> = std::result::Result<T, MarkupError>;

/// Errors that can occur while parsing, loading or editing markup.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// The input does not match a recognized construct, or a required
    /// terminator (end tag, closing quote, `-->`, `]]>`, `?>`) is missing.
    #[error("Malformed markup at byte {offset}: {message}")]
    MalformedMarkup {
        message: String,
        /// Byte offset into the parsed input where the bad construct starts.
        offset: usize,
    },

    /// A file-based entry point was given a path that does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An empty name or path was passed where one is required.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A node cannot be attached where it was asked to go.
    #[error("Invalid node relation: {message}")]
    NodeRelation { message: String },

    /// I/O error other than a missing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarkupError {
    pub(crate) fn malformed(message: impl Into<String>, offset: usize) -> Self {
        MarkupError::MalformedMarkup {
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        MarkupError::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn relation(message: impl Into<String>) -> Self {
        MarkupError::NodeRelation {
            message: message.into(),
        }
    }

    /// Stable error code, suitable for searching and for machine output.
    pub fn code(&self) -> &'static str {
        match self {
            MarkupError::MalformedMarkup { .. } => "M-1",
            MarkupError::FileNotFound { .. } => "M-2",
            MarkupError::InvalidArgument { .. } => "M-3",
            MarkupError::NodeRelation { .. } => "M-4",
            MarkupError::Io(_) => "M-5",
        }
    }

    /// Short title used as the headline of a rendered report.
    pub fn title(&self) -> &'static str {
        match self {
            MarkupError::MalformedMarkup { .. } => "Malformed Markup",
            MarkupError::FileNotFound { .. } => "File Not Found",
            MarkupError::InvalidArgument { .. } => "Invalid Argument",
            MarkupError::NodeRelation { .. } => "Invalid Node Relation",
            MarkupError::Io(_) => "I/O Error",
        }
    }

    /// Byte offset of the failure, for errors that come from the input text.
    pub fn offset(&self) -> Option<usize> {
        match self {
            MarkupError::MalformedMarkup { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, MarkupError::MalformedMarkup { .. })
    }
}
