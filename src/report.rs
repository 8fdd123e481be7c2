//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - JSON: the metadata document itself, for the downstream generators
//! - Pretty: colored terminal summary for humans

use colored::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::batch::{BatchResult, FileOutcome};
use crate::document::{AnalysisReport, MetadataDocument};

/// Serialize any result to pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write JSON to `output`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = to_json(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, json + "\n")?;
            tracing::info!(path = %path.display(), "analysis result saved");
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Render one report as a human-readable summary.
pub fn format_pretty(path: &str, report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", path.bold());
    match report {
        AnalysisReport::Metadata(doc) => format_document(&mut out, doc),
        AnalysisReport::Error { error } => {
            let _ = writeln!(out, "  {} {}", "incompatible:".red().bold(), error);
        }
    }
    out
}

fn format_document(out: &mut String, doc: &MetadataDocument) {
    if doc.functions.is_empty() {
        let _ = writeln!(out, "  {}", "no functions".dimmed());
    } else {
        let _ = writeln!(out, "  {} ({})", "functions".cyan(), doc.functions.len());
        for function in &doc.functions {
            let _ = writeln!(out, "    {}", function.signature());
        }
    }

    let import_count = doc.imports.len() + doc.imports_from.len();
    if import_count == 0 {
        return;
    }
    let _ = writeln!(out, "  {} ({})", "imports".cyan(), import_count);
    for import in &doc.imports {
        match &import.asname {
            Some(asname) => {
                let _ = writeln!(out, "    import {} as {}", import.name, asname);
            }
            None => {
                let _ = writeln!(out, "    import {}", import.name);
            }
        }
    }
    for from in &doc.imports_from {
        let names: Vec<String> = from
            .imports
            .iter()
            .map(|i| match &i.asname {
                Some(asname) => format!("{} as {}", i.name, asname),
                None => i.name.clone(),
            })
            .collect();
        let _ = writeln!(
            out,
            "    from {}{} import {}",
            ".".repeat(from.level as usize),
            from.module,
            names.join(", ")
        );
    }
}

/// Write one report as a human-readable summary to `output`, or to stdout.
///
/// Colors are dropped when writing to a file.
pub fn write_pretty(
    path: &str,
    report: &AnalysisReport,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    if output.is_some() {
        colored::control::set_override(false);
    }
    write_text(&format_pretty(path, report), output)
}

/// Render a batch of reports followed by a summary line.
pub fn format_pretty_batch(results: &BatchResult) -> String {
    let mut out = String::new();
    let mut failed = 0;
    for (path, outcome) in results {
        match outcome {
            FileOutcome::Report(report) => {
                if report.is_error() {
                    failed += 1;
                }
                out.push_str(&format_pretty(path, report));
            }
            FileOutcome::Failed(message) => {
                failed += 1;
                let _ = writeln!(out, "{}", path.bold());
                let _ = writeln!(out, "  {} {}", "failed:".red().bold(), message);
            }
        }
    }
    let _ = writeln!(out);
    let summary = format!("{} files analyzed, {} with errors", results.len(), failed);
    if failed == 0 {
        let _ = writeln!(out, "{}", summary.green());
    } else {
        let _ = writeln!(out, "{}", summary.yellow());
    }
    out
}

/// Write a batch summary to `output`, or to stdout.
pub fn write_pretty_batch(results: &BatchResult, output: Option<&Path>) -> anyhow::Result<()> {
    if output.is_some() {
        colored::control::set_override(false);
    }
    write_text(&format_pretty_batch(results), output)
}

fn write_text(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, text)?;
            tracing::info!(path = %path.display(), "analysis summary saved");
        }
        None => print!("{}", text),
    }
    Ok(())
}
