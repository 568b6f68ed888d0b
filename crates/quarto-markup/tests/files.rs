/*
 * files.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::fs;

use pretty_assertions::assert_eq;
use quarto_markup::{MarkupError, ParseOutcome, parse_file, try_parse_file};
use tempfile::TempDir;

#[test]
fn test_parse_file_reads_whole_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("menu.xml");
    fs::write(&path, "<menu>\n  <item id=\"1\">Open</item>\n</menu>\n").unwrap();

    let doc = parse_file(&path).unwrap();
    let menu = doc.node(doc.document_element().unwrap());
    assert_eq!(menu.name(), "menu");
    let item = menu.child_element("item").unwrap();
    assert_eq!(item.attribute("id"), Some("1"));
    assert_eq!(item.inner_text(), "Open");
}

#[test]
fn test_missing_file_is_file_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.xml");
    match parse_file(&path) {
        Err(MarkupError::FileNotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected FileNotFound, got {:?}", other),
    }
}

#[test]
fn test_empty_path_is_invalid_argument() {
    let err = parse_file("").unwrap_err();
    assert!(matches!(err, MarkupError::InvalidArgument { .. }), "{:?}", err);
    assert_eq!(err.code(), "M-3");
}

#[test]
fn test_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = parse_file(dir.path()).unwrap_err();
    assert!(matches!(err, MarkupError::Io(_)), "{:?}", err);
}

#[test]
fn test_malformed_file_reports_offset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xml");
    fs::write(&path, "<a><b></a>").unwrap();

    let err = parse_file(&path).unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(err.offset(), Some(3));
}

#[test]
fn test_try_parse_file_captures_outcome() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.xml");
    let bad = dir.path().join("bad.xml");
    fs::write(&good, "<ok/>").unwrap();
    fs::write(&bad, "<bad").unwrap();

    let outcomes: Vec<ParseOutcome> = [&good, &bad, &dir.path().join("missing.xml")]
        .into_iter()
        .map(try_parse_file)
        .collect();
    assert!(outcomes[0].is_parsed());
    assert!(outcomes[1].error().is_some_and(MarkupError::is_malformed));
    assert!(matches!(
        outcomes[2].error(),
        Some(MarkupError::FileNotFound { .. })
    ));
}
