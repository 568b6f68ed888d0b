/*
 * diagnostic.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Human-readable rendering of [`MarkupError`]s.

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::error::MarkupError;

impl MarkupError {
    /// Renders this error as a report.
    ///
    /// Errors that point into the input are drawn against `source` with the
    /// failing position labelled. Other errors become a single
    /// `Error [code]: message` line.
    pub fn render_report(&self, source_name: &str, source: &str, color: bool) -> String {
        let Some(offset) = self.offset() else {
            return format!("Error [{}]: {}\n", self.code(), self);
        };

        // ariadne spans count characters, not bytes.
        let start = source
            .get(..offset.min(source.len()))
            .map_or(0, |prefix| prefix.chars().count());
        let end = (start + 1).min(source.chars().count().max(start));
        let message = match self {
            MarkupError::MalformedMarkup { message, .. } => message.as_str(),
            _ => self.title(),
        };

        let report = Report::build(ReportKind::Error, source_name.to_string(), start)
            .with_config(Config::default().with_color(color))
            .with_message(format!("[{}] {}", self.code(), self.title()))
            .with_label(
                Label::new((source_name.to_string(), start..end))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish();

        let mut output = Vec::new();
        match report.write((source_name.to_string(), Source::from(source)), &mut output) {
            Ok(()) => String::from_utf8_lossy(&output).into_owned(),
            Err(_) => format!("Error [{}]: {}\n", self.code(), self),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_render_malformed_report() {
        let source = "<root>\n  <item>\n</root>";
        let err = parse(source).unwrap_err();
        let rendered = err.render_report("menu.xml", source, false);
        assert!(rendered.contains("[M-1] Malformed Markup"), "{}", rendered);
        assert!(rendered.contains("missing end tag `</item>`"), "{}", rendered);
        assert!(rendered.contains("menu.xml"), "{}", rendered);
    }

    #[test]
    fn test_render_non_source_error() {
        let err = MarkupError::FileNotFound {
            path: PathBuf::from("gone.xml"),
        };
        assert_eq!(
            err.render_report("gone.xml", "", false),
            "Error [M-2]: File not found: gone.xml\n"
        );
    }

    #[test]
    fn test_render_error_at_end_of_input() {
        let source = "<a href=\"x";
        let err = parse(source).unwrap_err();
        let rendered = err.render_report("inline", source, false);
        assert!(rendered.contains("unterminated attribute value quote"), "{}", rendered);
    }
}
