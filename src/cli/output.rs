//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
///
/// `Auto` renders reports as tables and single values as YAML.
pub fn effective_format(format: OutputFormat, is_report: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_report {
                OutputFormat::Table
            } else {
                OutputFormat::Yaml
            }
        }
        other => other,
    }
}

/// Print a value as YAML or JSON.
///
/// Returns `false` for formats that need a dedicated renderer.
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Auto | OutputFormat::Table | OutputFormat::Csv => Ok(false),
    }
}

/// Write rows as CSV to stdout
pub fn print_csv<R: Serialize>(rows: &[R]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        writer.serialize(row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}
