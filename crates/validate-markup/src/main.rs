/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Checks markup files and reports every parse failure.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use quarto_markup::{MarkupError, ParseOutcome, try_parse_file};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validate markup files
#[derive(Parser, Debug)]
#[command(name = "validate-markup")]
#[command(about = "Parse markup files and report errors", long_about = None)]
struct Args {
    /// Files to check
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Print the re-serialized markup of each file that parses
    #[arg(long)]
    emit: bool,

    /// Print one JSON summary per file instead of reports
    #[arg(long)]
    json: bool,

    /// Raise log verbosity (-v debug, -vv trace) when RUST_LOG is unset
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Per-file result printed by `--json`.
#[derive(Debug, Serialize)]
struct FileSummary {
    file: String,
    ok: bool,
    nodes: usize,
    error: Option<String>,
}

impl FileSummary {
    fn new(path: &Path, outcome: &ParseOutcome) -> Self {
        Self {
            file: path.display().to_string(),
            ok: outcome.is_parsed(),
            nodes: outcome.document().map_or(0, |doc| doc.arena_len() - 1),
            error: outcome.error().map(ToString::to_string),
        }
    }
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "validate_markup=info,quarto_markup=warn",
        1 => "validate_markup=debug,quarto_markup=debug",
        _ => "validate_markup=trace,quarto_markup=trace",
    }
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

/// Returns whether every file parsed.
fn run() -> Result<bool> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(args.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0;

    for path in &args.files {
        let outcome = try_parse_file(path);
        debug!(path = %path.display(), ok = outcome.is_parsed(), "checked file");

        if args.json {
            let summary = FileSummary::new(path, &outcome);
            serde_json::to_writer(&mut out, &summary).context("Failed to write JSON summary")?;
            writeln!(out)?;
        }

        match &outcome {
            ParseOutcome::Parsed(doc) => {
                if args.emit {
                    writeln!(out, "{}", doc.to_markup_string())?;
                }
            }
            ParseOutcome::Failed(error) => {
                failed += 1;
                if !args.json {
                    eprint!("{}", render_failure(path, error));
                }
            }
        }
    }

    info!(files = args.files.len(), failed, "finished checking markup");
    Ok(failed == 0)
}

/// Renders a failure against the file's text when it can still be read.
fn render_failure(path: &Path, error: &MarkupError) -> String {
    let name = path.display().to_string();
    let source = match error.offset() {
        Some(_) => fs::read_to_string(path).unwrap_or_default(),
        None => String::new(),
    };
    error.render_report(&name, &source, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use quarto_markup::try_parse;

    #[test]
    fn test_summary_for_parsed_file() {
        let outcome = try_parse(r#"<a href="x">y</a>"#);
        let summary = FileSummary::new(Path::new("a.xml"), &outcome);
        assert_snapshot!(
            serde_json::to_string(&summary).unwrap(),
            @r#"{"file":"a.xml","ok":true,"nodes":3,"error":null}"#
        );
    }

    #[test]
    fn test_summary_for_failed_file() {
        let outcome = try_parse("<a>");
        let summary = FileSummary::new(Path::new("b.xml"), &outcome);
        assert!(!summary.ok);
        assert_eq!(summary.nodes, 0);
        assert_snapshot!(
            summary.error.unwrap(),
            @"Malformed markup at byte 0: missing end tag `</a>`"
        );
    }

    #[test]
    fn test_verbosity_filters() {
        assert_eq!(default_filter(0), "validate_markup=info,quarto_markup=warn");
        assert_eq!(default_filter(1), "validate_markup=debug,quarto_markup=debug");
        assert_eq!(default_filter(5), "validate_markup=trace,quarto_markup=trace");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["validate-markup", "-vv", "--json", "a.xml", "b.xml"])
            .unwrap();
        assert_eq!(args.verbose, 2);
        assert!(args.json);
        assert!(!args.emit);
        assert_eq!(args.files.len(), 2);
        assert!(Args::try_parse_from(["validate-markup"]).is_err());
    }
}
