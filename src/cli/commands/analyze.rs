//! `iqc analyze` command - extract and run SPC statistics on documents

use clap::Args;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{collect_documents, display_path, format_out_of_spec, smart_round};
use crate::cli::output::{effective_format, print_csv, print_structured};
use crate::cli::table::{capability_table, styled_status, CapabilityRow};
use crate::cli::viz::{render_range_bar, render_xbar_r, CHART_HEIGHT, CHART_WIDTH};
use crate::cli::{load_config, GlobalOpts, OutputFormat};
use crate::core::analysis::analyze_document;
use crate::core::capability::LotStatus;
use crate::core::config::Config;
use crate::entities::report::InspectionReport;
use crate::extract::TableExtractor;

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Document files or directories (md, markdown, html, htm, txt)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Rational subgroup size (2-10)
    #[arg(long, env = "IQC_SUBGROUP_SIZE")]
    pub subgroup_size: Option<usize>,

    /// Sample size when the document does not declare one
    #[arg(long, env = "IQC_SAMPLE_SIZE")]
    pub sample_size: Option<usize>,

    /// Minimum measurements for a dimension to be kept
    #[arg(long, env = "IQC_MIN_COUNT")]
    pub min_count: Option<usize>,

    /// Draw Xbar-R control charts and tolerance bars
    #[arg(long)]
    pub chart: bool,

    /// Exit with an error when any dimension is NG
    #[arg(long)]
    pub strict: bool,
}

impl AnalyzeArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(n) = self.subgroup_size {
            config.analysis.subgroup_size = n;
        }
        if let Some(n) = self.sample_size {
            config.extraction.default_sample_size = n;
        }
        if let Some(n) = self.min_count {
            config.extraction.min_measurements = n;
        }
    }
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?;
    args.apply(&mut config);
    config.validate("command line")?;

    let documents = collect_documents(&args.paths)?;
    if documents.is_empty() {
        return Err(miette::miette!(
            help = "supported extensions: md, markdown, html, htm, txt",
            "No documents found"
        ));
    }

    let extractor = TableExtractor::new(config.extraction.clone());
    let mut reports = Vec::with_capacity(documents.len());
    for path in &documents {
        let document = extractor.extract_file(path)?;
        let report = analyze_document(display_path(path), document, &config.analysis);
        if report.is_unrecognized() {
            tracing::warn!(path = %path.display(), "no dimensions recognized");
        }
        reports.push(report);
    }

    let format = effective_format(global.format, true);
    if !print_structured(&reports, format)? {
        match format {
            OutputFormat::Csv => {
                let rows: Vec<CapabilityRow> = reports
                    .iter()
                    .flat_map(|r| {
                        r.dimensions
                            .iter()
                            .map(move |d| CapabilityRow::new(&r.source, d))
                    })
                    .collect();
                print_csv(&rows)?;
            }
            _ => {
                for report in &reports {
                    print_report(report, args.chart);
                }
            }
        }
    }

    let ng: usize = reports.iter().map(|r| r.summary.ng).sum();
    if args.strict && ng > 0 {
        let total: usize = reports.iter().map(|r| r.summary.dimensions).sum();
        return Err(miette::miette!(
            "{} of {} dimensions NG (out-of-tolerance parts found)",
            ng,
            total
        ));
    }
    Ok(())
}

fn print_report(report: &InspectionReport, chart: bool) {
    println!("{} {}", style("▸").cyan(), style(&report.source).bold());

    let meta = &report.metadata;
    let mut details = Vec::new();
    if let Some(ref name) = meta.material_name {
        details.push(format!("material {}", name));
    }
    if let Some(ref code) = meta.material_code {
        details.push(format!("code {}", code));
    }
    if let Some(ref batch) = meta.batch_number {
        details.push(format!("batch {}", batch));
    }
    if let Some(ref supplier) = meta.supplier {
        details.push(format!("supplier {}", supplier));
    }
    if let Some(n) = meta.sample_size {
        details.push(format!("sample size {}", n));
    }
    if !details.is_empty() {
        println!("  {}", style(details.join(" · ")).dim());
    }

    if report.is_unrecognized() {
        println!(
            "  {} no dimensions recognized in this document",
            style("!").yellow()
        );
        println!();
        return;
    }

    let rows: Vec<CapabilityRow> = report
        .dimensions
        .iter()
        .map(|d| CapabilityRow::new(&report.source, d))
        .collect();
    println!("{}", capability_table(&rows));

    for dim in &report.dimensions {
        let cap = &dim.capability;
        println!();
        println!(
            "  {} {}  {}",
            style(&dim.record.identity).cyan().bold(),
            dim.record.name,
            styled_status(cap.status)
        );
        println!("    {}", cap.conclusion);
        if let Some(parts) = format_out_of_spec(&dim.record) {
            println!("    {} out of tolerance: {}", style("✗").red(), parts);
        }
        println!("    {}", style(&cap.suggestion).dim());
        if dim.low_confidence_spec {
            println!(
                "    {} tolerance '{}' read as {}; limits are assumed",
                style("!").yellow(),
                dim.record.spec.raw_text,
                dim.record.spec.grammar
            );
        }
        if !dim.outliers.is_empty() {
            let band = dim.record.spec.tolerance_band();
            let values: Vec<String> = dim
                .outliers
                .values
                .iter()
                .map(|v| smart_round(*v, band))
                .collect();
            println!(
                "    {} outliers beyond mean ± kσ: {}",
                style("!").yellow(),
                values.join(", ")
            );
        }
        if cap.ppm_observed > 0.0 || cap.ppm_expected >= 1.0 {
            println!(
                "    PPM observed {:.0}, expected {:.0}",
                cap.ppm_observed, cap.ppm_expected
            );
        }

        if chart {
            println!();
            println!(
                "{}",
                render_range_bar(cap.min, cap.max, dim.record.spec.lsl, dim.record.spec.usl)
            );
            println!();
            println!("{}", render_xbar_r(dim, CHART_WIDTH, CHART_HEIGHT));
        }
    }

    let summary = &report.summary;
    let status = report.status();
    println!();
    println!(
        "  {} {} dimensions: {} OK, {} NG · {} capable, {} acceptable, {} incapable",
        match status {
            LotStatus::Ok => style("✓").green(),
            LotStatus::Ng => style("✗").red(),
        },
        summary.dimensions,
        summary.ok,
        summary.ng,
        summary.capable,
        summary.acceptable,
        summary.incapable
    );
    println!();
}
