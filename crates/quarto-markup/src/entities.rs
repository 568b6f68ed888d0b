/*
 * entities.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Escaping and unescaping of the five reserved markup characters.
//!
//! Only `<`, `>`, `&`, `'` and `"` are touched. Numeric character
//! references and other named entities pass through decoding unchanged.

use std::borrow::Cow;

/// Replaces the reserved characters with `&lt;`, `&gt;`, `&amp;`, `&apos;`
/// and `&quot;`. Borrows when nothing needs escaping.
pub fn escape(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// Reverses [`escape`].
///
/// `&amp;` is decoded last so that `&amp;lt;` becomes `&lt;` rather than `<`.
pub fn unescape(escaped: &str) -> Cow<'_, str> {
    if !escaped.contains('&') {
        return Cow::Borrowed(escaped);
    }
    Cow::Owned(
        escaped
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&apos;", "'")
            .replace("&quot;", "\"")
            .replace("&amp;", "&"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reserved_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_borrows_plain_text() {
        assert!(matches!(escape("plain text é"), Cow::Borrowed(_)));
        assert!(matches!(unescape("plain text é"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape_reverses_escape() {
        for raw in ["", "a < b", "x && y", r#"say "hi""#, "it's", "<>&'\"", "ünï <ç>"] {
            assert_eq!(unescape(&escape(raw)), raw, "failed for {:?}", raw);
        }
    }

    #[test]
    fn test_unescape_decodes_ampersand_last() {
        assert_eq!(unescape("&amp;lt;"), "&lt;");
        assert_eq!(unescape("&amp;amp;"), "&amp;");
    }

    #[test]
    fn test_unescape_leaves_other_entities() {
        assert_eq!(unescape("&nbsp;&#65;&lt;"), "&nbsp;&#65;<");
    }
}
