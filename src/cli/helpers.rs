//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};
use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::entities::dimension::DimensionRecord;
use crate::extract::is_document;

/// Format a value with precision relative to a reference magnitude
///
/// A tolerance band of 0.2 prints measurements with 3 decimals, a band of
/// 0.02 with 4, and so on (at least 2, at most 6).
pub fn smart_round(value: f64, reference: f64) -> String {
    let reference = reference.abs().max(1e-9);
    let decimals = ((-reference.log10()).ceil() as i64 + 2).clamp(2, 6) as usize;
    format!("{:.*}", decimals, value)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse measurement tokens separated by whitespace, commas or semicolons
pub fn parse_values<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<f64>> {
    tokens
        .iter()
        .flat_map(|t| {
            t.as_ref()
                .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .map(|token| match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(miette::miette!("Not a number: '{}'", token)),
        })
        .collect()
}

/// Read measurement values from stdin if it is piped
///
/// Returns `None` when stdin is a terminal.
pub fn read_values_from_stdin() -> Result<Option<Vec<f64>>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let lines: Vec<String> = stdin
        .lock()
        .lines()
        .collect::<std::result::Result<_, _>>()
        .into_diagnostic()?;
    parse_values(&lines).map(Some)
}

/// Expand files and directories into the document files they contain
///
/// Explicit file arguments are kept whatever their extension; directories are
/// walked for known document extensions, sorted by path.
pub fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_file() {
            documents.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_document(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            tracing::debug!(dir = %path.display(), documents = found.len(), "walked directory");
            documents.extend(found);
        } else {
            return Err(miette::miette!(
                "No such file or directory: {}",
                path.display()
            ));
        }
    }
    Ok(documents)
}

/// Out-of-tolerance parts of a record as `#seq value`, `None` when all pass
pub fn format_out_of_spec(record: &DimensionRecord) -> Option<String> {
    let band = record.spec.tolerance_band();
    let parts: Vec<String> = record
        .out_of_spec()
        .map(|(i, value)| format!("#{} {}", i + 1, smart_round(value, band)))
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Display name for a document path
pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}
