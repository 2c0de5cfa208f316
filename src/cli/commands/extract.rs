//! `iqc extract` command - dimension records and batch metadata

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::output::{effective_format, print_csv, print_structured};
use crate::cli::table::{record_table, RecordRow};
use crate::cli::{load_config, GlobalOpts, OutputFormat};
use crate::extract::TableExtractor;

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Document to read
    pub file: PathBuf,

    /// Sample size when the document does not declare one
    #[arg(long, env = "IQC_SAMPLE_SIZE")]
    pub sample_size: Option<usize>,

    /// Minimum measurements for a dimension to be kept
    #[arg(long, env = "IQC_MIN_COUNT")]
    pub min_count: Option<usize>,
}

/// One measurement per CSV row
#[derive(Debug, serde::Serialize)]
struct MeasurementRow<'a> {
    dimension: &'a str,
    spec: &'a str,
    lsl: f64,
    usl: f64,
    index: usize,
    value: f64,
}

pub fn run(args: ExtractArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?;
    if let Some(n) = args.sample_size {
        config.extraction.default_sample_size = n;
    }
    if let Some(n) = args.min_count {
        config.extraction.min_measurements = n;
    }
    config.validate("command line")?;

    let document = TableExtractor::new(config.extraction).extract_file(&args.file)?;

    let format = effective_format(global.format, true);
    if print_structured(&document, format)? {
        return Ok(());
    }

    if format == OutputFormat::Csv {
        let rows: Vec<MeasurementRow<'_>> = document
            .records
            .iter()
            .flat_map(|record| {
                record
                    .measurements
                    .iter()
                    .enumerate()
                    .map(move |(i, &value)| MeasurementRow {
                        dimension: &record.identity,
                        spec: &record.spec.raw_text,
                        lsl: record.spec.lsl,
                        usl: record.spec.usl,
                        index: i + 1,
                        value,
                    })
            })
            .collect();
        return print_csv(&rows);
    }

    println!(
        "{} {} ({} tables)",
        style("▸").cyan(),
        style(args.file.display()).bold(),
        document.tables
    );
    if !document.metadata.is_empty() {
        let yaml = serde_yml::to_string(&document.metadata).into_diagnostic()?;
        for line in yaml.lines() {
            println!("  {}", style(line).dim());
        }
    }

    if document.records.is_empty() {
        println!("  {} no dimensions recognized", style("!").yellow());
        return Ok(());
    }

    let rows: Vec<RecordRow> = document.records.iter().map(RecordRow::new).collect();
    println!("{}", record_table(&rows));
    Ok(())
}
